//! Escalate dialog: points the user to a person.

use async_trait::async_trait;
use serde_json::json;

use super::ESCALATE;
use crate::domain::dialog::{
    Dialog, DialogError, DialogResult, StepContext, StepInput, StepOutcome,
};

const STEPS: &[&str] = &["share_contact"];

pub struct EscalateDialog {
    contact: String,
}

impl EscalateDialog {
    pub fn new(contact: impl Into<String>) -> Self {
        Self {
            contact: contact.into(),
        }
    }
}

#[async_trait]
impl Dialog for EscalateDialog {
    fn id(&self) -> &str {
        ESCALATE
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    async fn run_step(
        &self,
        _step: usize,
        ctx: &mut StepContext<'_>,
        _input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        ctx.turn.send_text(self.contact.clone());
        Ok(StepOutcome::Complete(DialogResult::with_value(
            json!({ "processingComplete": true }),
        )))
    }
}
