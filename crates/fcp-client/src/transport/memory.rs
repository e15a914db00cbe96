//! In-process node implementing the connection contract
//!
//! `MemoryConnection` keeps a name-addressed store in memory and answers
//! requests the way a node does: progress messages first, then one terminal
//! message, all delivered from a dedicated dispatch thread. Link outages,
//! permanent closure, redirects and rejections can be staged so callers can
//! exercise every path of the high-level client without a socket.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

use super::{Connection, ResponseListener};
use crate::error::{Result, SubmitError};
use crate::message::{Request, Response, Verb, headers, types};

const CODE_DATA_NOT_FOUND: u32 = 13;
const CODE_PERMANENT_REDIRECT: u32 = 27;
const CODE_COLLISION: u32 = 9;

enum Dispatch {
    Deliver {
        listener: Arc<dyn ResponseListener>,
        responses: Vec<Response>,
    },
    Close(Arc<dyn ResponseListener>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Up,
    Down { remaining: u32 },
    Closed,
}

struct NodeState {
    link: LinkState,
    store: HashMap<String, Bytes>,
    redirects: HashMap<String, Option<String>>,
    rejections: HashMap<String, u32>,
    scripted: VecDeque<Vec<Response>>,
    submitted: Vec<Request>,
    unavailable_reports: u64,
    holding: bool,
    held: Vec<(Arc<dyn ResponseListener>, Vec<Response>)>,
    next_identifier: u64,
}

impl NodeState {
    fn new() -> Self {
        Self {
            link: LinkState::Up,
            store: HashMap::new(),
            redirects: HashMap::new(),
            rejections: HashMap::new(),
            scripted: VecDeque::new(),
            submitted: Vec::new(),
            unavailable_reports: 0,
            holding: false,
            held: Vec::new(),
            next_identifier: 0,
        }
    }

    fn answer(&mut self, request: &Request) -> Vec<Response> {
        match request.verb() {
            Verb::ClientGet => self.answer_get(request.header(headers::URI)),
            Verb::ClientPut => self.answer_put(request.header(headers::URI), request.data()),
            Verb::GenerateSsk => vec![generate_key_pair()],
        }
    }

    fn answer_get(&self, uri: Option<&str>) -> Vec<Response> {
        let Some(uri) = uri else {
            return vec![missing_uri()];
        };

        if let Some(target) = self.redirects.get(uri) {
            let mut failed = Response::new(types::GET_FAILED)
                .with_header(headers::CODE, CODE_PERMANENT_REDIRECT.to_string())
                .with_header(headers::CODE_DESCRIPTION, "Permanent redirect");
            if let Some(target) = target {
                failed = failed.with_header(headers::REDIRECT_URI, target.clone());
            }
            return vec![failed];
        }

        match self.store.get(uri) {
            Some(data) => vec![
                Response::new(types::DATA_FOUND)
                    .with_header(headers::DATA_LENGTH, data.len().to_string()),
                Response::new(types::ALL_DATA)
                    .with_header(headers::DATA_LENGTH, data.len().to_string())
                    .with_data(data.clone()),
            ],
            None => vec![
                Response::new(types::GET_FAILED)
                    .with_header(headers::CODE, CODE_DATA_NOT_FOUND.to_string())
                    .with_header(headers::CODE_DESCRIPTION, "Data not found"),
            ],
        }
    }

    fn answer_put(&mut self, uri: Option<&str>, data: Option<&Bytes>) -> Vec<Response> {
        let Some(uri) = uri else {
            return vec![missing_uri()];
        };

        if let Some(code) = self.rejections.get(uri) {
            return vec![
                Response::new(types::PUT_FAILED)
                    .with_header(headers::URI, uri)
                    .with_header(headers::CODE, code.to_string()),
            ];
        }

        if self.store.contains_key(uri) {
            return vec![
                Response::new(types::PUT_FAILED)
                    .with_header(headers::URI, uri)
                    .with_header(headers::CODE, CODE_COLLISION.to_string())
                    .with_header(
                        headers::CODE_DESCRIPTION,
                        "Insert collided with different, pre-existing data at the same key",
                    ),
            ];
        }

        self.store
            .insert(uri.to_string(), data.cloned().unwrap_or_default());
        vec![
            Response::new(types::URI_GENERATED).with_header(headers::URI, uri),
            Response::new(types::PUT_SUCCESSFUL).with_header(headers::URI, uri),
        ]
    }
}

fn missing_uri() -> Response {
    Response::new(types::PROTOCOL_ERROR)
        .with_header(headers::CODE, "5")
        .with_header(headers::CODE_DESCRIPTION, "No URI")
}

fn generate_key_pair() -> Response {
    let private: [u8; 32] = rand::random();
    let public: [u8; 32] = rand::random();
    let crypto: [u8; 32] = rand::random();
    let crypto = hex::encode(crypto);
    Response::new(types::SSK_KEYPAIR)
        .with_header(
            headers::INSERT_URI,
            format!("SSK@{},{crypto}/", hex::encode(private)),
        )
        .with_header(
            headers::REQUEST_URI,
            format!("SSK@{},{crypto}/", hex::encode(public)),
        )
}

fn run_dispatcher(receiver: mpsc::Receiver<Dispatch>) {
    for job in receiver {
        match job {
            Dispatch::Deliver {
                listener,
                responses,
            } => {
                for response in responses {
                    trace!("Dispatching {}", response.message_type());
                    listener.on_response(response);
                }
            }
            Dispatch::Close(listener) => listener.on_closed(),
        }
    }
    trace!("Dispatcher stopped");
}

/// In-memory node with its own dispatch thread
pub struct MemoryConnection {
    state: Mutex<NodeState>,
    dispatch: Mutex<Option<mpsc::Sender<Dispatch>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryConnection {
    pub fn new() -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("fcp-dispatch".to_string())
            .spawn(move || run_dispatcher(receiver))?;

        Ok(Self {
            state: Mutex::new(NodeState::new()),
            dispatch: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Occupy `name` with `data`
    pub fn store(&self, name: impl Into<String>, data: impl Into<Bytes>) {
        self.state.lock().store.insert(name.into(), data.into());
    }

    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.state.lock().store.get(name).cloned()
    }

    /// Answer fetches of `from` with a permanent redirect, optionally naming
    /// the replacement
    pub fn redirect(&self, from: impl Into<String>, to: Option<&str>) {
        self.state
            .lock()
            .redirects
            .insert(from.into(), to.map(ToString::to_string));
    }

    /// Fail inserts to `name` with `code`
    pub fn reject(&self, name: impl Into<String>, code: u32) {
        self.state.lock().rejections.insert(name.into(), code);
    }

    /// Answer the next accepted request with `responses` verbatim
    pub fn script(&self, responses: Vec<Response>) {
        self.state.lock().scripted.push_back(responses);
    }

    /// Report the link as down for the next `attempts` submissions
    pub fn set_unavailable(&self, attempts: u32) {
        let mut state = self.state.lock();
        if state.link != LinkState::Closed {
            state.link = if attempts == 0 {
                LinkState::Up
            } else {
                LinkState::Down {
                    remaining: attempts,
                }
            };
        }
    }

    /// Number of submissions refused because the link was down
    pub fn unavailable_reports(&self) -> u64 {
        self.state.lock().unavailable_reports
    }

    /// Keep accepting requests but withhold their responses
    pub fn hold_responses(&self) {
        self.state.lock().holding = true;
    }

    /// Deliver everything withheld since [`Self::hold_responses`]
    pub fn release_responses(&self) {
        let held = {
            let mut state = self.state.lock();
            state.holding = false;
            std::mem::take(&mut state.held)
        };
        for (listener, responses) in held {
            // Listeners whose dispatch fails are dropped, which their waiters
            // observe as a closed link.
            let _ = self.dispatch(Dispatch::Deliver {
                listener,
                responses,
            });
        }
    }

    /// Close the link permanently, notifying every request still waiting
    pub fn close(&self) {
        let held = {
            let mut state = self.state.lock();
            state.link = LinkState::Closed;
            std::mem::take(&mut state.held)
        };
        debug!("Closing link with {} pending requests", held.len());
        for (listener, _) in held {
            let _ = self.dispatch(Dispatch::Close(listener));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().link == LinkState::Closed
    }

    /// Every request accepted so far, in submission order
    pub fn submitted(&self) -> Vec<Request> {
        self.state.lock().submitted.clone()
    }

    /// Drain the submission log, releasing the payloads it holds
    pub fn take_submitted(&self) -> Vec<Request> {
        std::mem::take(&mut self.state.lock().submitted)
    }

    fn dispatch(&self, job: Dispatch) -> std::result::Result<(), SubmitError> {
        match self.dispatch.lock().as_ref() {
            Some(sender) => sender.send(job).map_err(|_| SubmitError::Terminated),
            None => Err(SubmitError::Terminated),
        }
    }
}

impl Connection for MemoryConnection {
    fn submit(
        &self,
        listener: Arc<dyn ResponseListener>,
        mut request: Request,
    ) -> std::result::Result<(), SubmitError> {
        let mut state = self.state.lock();
        match state.link {
            LinkState::Closed => return Err(SubmitError::Terminated),
            LinkState::Down { remaining } => {
                state.link = if remaining > 1 {
                    LinkState::Down {
                        remaining: remaining - 1,
                    }
                } else {
                    LinkState::Up
                };
                state.unavailable_reports += 1;
                return Err(SubmitError::NoNode("node link is down".to_string()));
            }
            LinkState::Up => {}
        }

        state.next_identifier += 1;
        let identifier = format!("fcp-{}", state.next_identifier);
        request.set_header(headers::IDENTIFIER, identifier.clone());
        trace!("Accepted {} as {}", request.verb(), identifier);

        let responses = match state.scripted.pop_front() {
            Some(responses) => responses,
            None => state.answer(&request),
        };
        let responses = responses
            .into_iter()
            .map(|r| r.with_header(headers::IDENTIFIER, identifier.clone()))
            .collect();
        state.submitted.push(request);

        if state.holding {
            state.held.push((listener, responses));
            return Ok(());
        }
        drop(state);

        self.dispatch(Dispatch::Deliver {
            listener,
            responses,
        })
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.dispatch.lock().take();
        if let Some(worker) = self.worker.lock().take() {
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}
