use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai_client::{AiError, AiGateway, AiTask, Completion, GatewayRequest};
use crate::models::profile::GroundingSource;

/// Test gateway that replays queued replies in order and records each task.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<Completion, String>>>,
    seen: Mutex<Vec<AiTask>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.reply_grounded(text, vec![])
    }

    pub fn reply_grounded(self, text: &str, grounding: Vec<GroundingSource>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(Completion {
            text: text.to_string(),
            grounding,
        }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn tasks(&self) -> Vec<AiTask> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiGateway for ScriptedGateway {
    async fn complete(&self, request: &GatewayRequest) -> Result<Completion, AiError> {
        self.seen.lock().unwrap().push(request.task);
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(AiError::Api {
                status: 503,
                message,
            }),
            None => Err(AiError::Exhausted { attempts: 1 }),
        }
    }
}
