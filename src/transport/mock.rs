use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;
use crate::transport::transport_model::{ActionReply, ActionRequest, Transport};

/// One canned answer: either a decoded reply or a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptedReply {
    Fail { fail: String },
    Reply(ActionReply),
}

/// Answers requests from a queue, in order. An empty queue behaves like an
/// unreachable server.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: VecDeque<ScriptedReply>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }

    pub fn push(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for MockTransport {
    fn post(&mut self, request: &ActionRequest) -> Result<ActionReply, PanelError> {
        match self.replies.pop_front() {
            Some(ScriptedReply::Reply(reply)) => Ok(reply),
            Some(ScriptedReply::Fail { fail }) => Err(PanelError::Transport {
                path: request.path.clone(),
                message: fail,
            }),
            None => Err(PanelError::Transport {
                path: request.path.clone(),
                message: "no scripted reply left".to_string(),
            }),
        }
    }
}
