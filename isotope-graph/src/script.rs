//! Scripts describe the outbound calls a service makes when it receives a request.
//!
//! A [`Script`] runs its [`Command`]s one after another. A command is either a single
//! [`RequestCommand`], or a [`ConcurrentCommand`] whose children all run at the same time. The
//! two can nest arbitrarily deep:
//!
//! ```yaml
//! script:
//!   - service: a          # call `a`, then
//!   - - service: b        # call `b` and `c` concurrently
//!     - service: c
//! ```
//!
//! Targets are referenced by service name, so calls may form cycles across services.

use isotope_types::ByteSize;
use serde::{Serialize, Serializer};

/// A single outbound call to another service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestCommand {
    /// Name of the service to call.
    #[serde(rename = "service")]
    pub service_name: String,
    /// Size of the request payload.
    pub size: ByteSize,
}

impl RequestCommand {
    /// Creates a request to `service_name` with the given payload size.
    pub fn new(service_name: impl Into<String>, size: ByteSize) -> Self {
        Self {
            service_name: service_name.into(),
            size,
        }
    }
}

/// A group of commands that execute concurrently.
///
/// Element order carries no meaning for execution, but is kept so that documents round-trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConcurrentCommand(pub Vec<Command>);

/// One step of a [`Script`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Call a single service. Serialized as `{service, size}`.
    Request(RequestCommand),
    /// Run a group of commands at the same time. Serialized as a nested list.
    Concurrent(ConcurrentCommand),
}

impl Command {
    /// Returns all requests in this command, depth-first and in document order.
    pub fn requests(&self) -> Vec<&RequestCommand> {
        let mut requests = Vec::new();
        self.collect_requests(&mut requests);
        requests
    }

    fn collect_requests<'a>(&'a self, requests: &mut Vec<&'a RequestCommand>) {
        match self {
            Command::Request(request) => requests.push(request),
            Command::Concurrent(ConcurrentCommand(commands)) => {
                for command in commands {
                    command.collect_requests(requests);
                }
            }
        }
    }
}

impl From<RequestCommand> for Command {
    fn from(request: RequestCommand) -> Self {
        Command::Request(request)
    }
}

impl From<ConcurrentCommand> for Command {
    fn from(concurrent: ConcurrentCommand) -> Self {
        Command::Concurrent(concurrent)
    }
}

impl Serialize for Command {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Command::Request(request) => request.serialize(serializer),
            Command::Concurrent(concurrent) => concurrent.serialize(serializer),
        }
    }
}

/// The commands a service executes in sequence for every incoming request.
///
/// An empty script and a script holding one empty [`ConcurrentCommand`] are different values and
/// serialize as `[]` and `[[]]` respectively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Script(pub Vec<Command>);

impl Script {
    /// Returns `true` if the script makes no calls at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the top-level commands.
    pub fn commands(&self) -> &[Command] {
        &self.0
    }

    /// Returns all requests in the script, depth-first and in document order.
    pub fn requests(&self) -> Vec<&RequestCommand> {
        let mut requests = Vec::new();
        for command in &self.0 {
            command.collect_requests(&mut requests);
        }
        requests
    }
}

impl FromIterator<Command> for Script {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
