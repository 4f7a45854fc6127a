//! Demonstration object graph
//!
//! A small server/worker pair wired into a reference cycle, used by the
//! binary to showcase every value kind the formatter knows about.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::repr::Repr;
use crate::value::{Represent, Value};

/// A listening endpoint holding a mutable link to its worker.
pub struct Server {
    /// Endpoint name.
    pub name: String,
    /// Listening port.
    pub port: i64,
    /// The worker serving this endpoint, wired after construction.
    pub worker: RefCell<Option<Rc<Worker>>>,
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Server({}:{})", self.name, self.port)
    }
}

impl Represent for Server {
    fn repr(&self) -> Option<Repr> {
        let link = self
            .worker
            .borrow()
            .as_ref()
            .map_or(Value::None, |w| Value::object(w.clone()));
        Some(
            Repr::new(self)
                .arg(self.name.as_str())
                .kwarg("port", self.port)
                .kwarg("worker", link),
        )
    }
}

/// A worker holding a back-link to its server.
pub struct Worker {
    /// Worker label.
    pub label: String,
    /// The owning server, wired after construction.
    pub server: RefCell<Option<Rc<Server>>>,
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker({})", self.label)
    }
}

impl Represent for Worker {
    fn repr(&self) -> Option<Repr> {
        let link = self
            .server
            .borrow()
            .as_ref()
            .map_or(Value::None, |s| Value::object(s.clone()));
        Some(Repr::new(self).arg(self.label.as_str()).kwarg("server", link))
    }
}

/// Render the showcase graph under the current settings.
///
/// The graph exercises every value kind, a self-referential keyword argument
/// and a genuine two-object cycle, so the output demonstrates cycle labels
/// alongside ordinary formatting.
#[must_use]
pub fn sample() -> String {
    let server = Rc::new(Server {
        name: "edge".to_string(),
        port: 8443,
        worker: RefCell::new(None),
    });
    let worker = Rc::new(Worker {
        label: "w0".to_string(),
        server: RefCell::new(None),
    });
    *server.worker.borrow_mut() = Some(worker.clone());
    *worker.server.borrow_mut() = Some(server.clone());

    Repr::named(&*server, "server")
        .note("live endpoint")
        .arg(server.name.as_str())
        .kwarg("port", server.port)
        .kwarg(
            "bindings",
            Value::list([Value::from("0.0.0.0"), Value::from("::1")]),
        )
        .kwarg(
            "limits",
            Value::dict([
                (Value::from("open_files"), Value::Int(1024)),
                (Value::from("timeout"), Value::Float(2.5)),
            ]),
        )
        .kwarg("window", Value::tuple([Value::Int(800)]))
        .kwarg("mode", Value::enum_member(["demo", "Mode"], "Secure"))
        .kwarg("codec", Value::class(["demo", "Codec"]))
        .kwarg(
            "on_close",
            Value::function_wrapped(["demo", "handlers", "on_close"]),
        )
        .kwarg("worker", Value::object(worker))
        .kwarg_or("retries", 0, 0)
        .attr("started", true)
        .attr("address", Value::opaque(std::net::Ipv4Addr::LOCALHOST))
        .build()
        .into_string()
}
