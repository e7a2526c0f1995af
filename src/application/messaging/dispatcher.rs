//! Command dispatcher - Validates, routes and answers inbound messages

use crate::application::errors::DispatchError;
use crate::application::services::Notifier;
use crate::domain::entities::{CommandContext, CommandRegistry, InboundMessage};
use crate::domain::traits::InboundStream;
use super::parser::MessageParser;

const VALIDATION_CONTEXT: &str = "Failed to validate message,";
const EXECUTION_CONTEXT: &str = "Failed to execute command,";

/// Runs each inbound message through validate → parse → route → arity →
/// invoke → respond. Every message ends in exactly one reply to the owner,
/// either the handler's confirmation or an error explanation.
pub struct CommandDispatcher {
    parser: MessageParser,
    registry: CommandRegistry,
    notifier: Notifier,
}

impl CommandDispatcher {
    pub fn new(parser: MessageParser, registry: CommandRegistry, notifier: Notifier) -> Self {
        Self {
            parser,
            registry,
            notifier,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Consume the inbound stream in delivery order, one message at a time
    pub async fn run(&self, mut inbound: InboundStream) {
        tracing::info!("Dispatcher started with {} commands", self.registry.len());

        while let Some(message) = inbound.recv().await {
            // Already logged and reported to the owner.
            let _ = self.process(message).await;
        }

        tracing::warn!("Inbound stream closed, dispatcher stopping");
    }

    /// Process one message.
    ///
    /// A failure has already been logged and reported to the owner when this
    /// returns; the error is handed back only so callers can observe it.
    pub async fn process(&self, message: InboundMessage) -> Result<(), DispatchError> {
        let result = self.dispatch(&message).await;

        if let Err(e) = &result {
            let context = if e.is_validation() {
                VALIDATION_CONTEXT
            } else {
                EXECUTION_CONTEXT
            };
            self.notifier.report(context, e).await;
        }

        result
    }

    async fn dispatch(&self, message: &InboundMessage) -> Result<(), DispatchError> {
        if message.sender != self.notifier.owner() {
            return Err(DispatchError::UnauthorizedSender(message.sender.clone()));
        }

        let command = self.parser.parse(&message.text)?;

        let spec = self.registry.get(&command.name).ok_or_else(|| {
            DispatchError::UnknownCommand(
                command.name.clone(),
                format!("{}man", self.parser.prefix()),
            )
        })?;

        if command.args.len() < spec.min_args {
            return Err(DispatchError::Arity {
                command: command.name.clone(),
                expected: spec.min_args,
                actual: command.args.len(),
            });
        }

        tracing::info!(
            "Executing {} with {} argument(s)",
            command.name,
            command.args.len()
        );

        let reply = spec
            .handler
            .handle(CommandContext {
                message,
                args: &command.args,
                registry: &self.registry,
            })
            .await?;

        self.notifier.send(reply).await?;
        Ok(())
    }
}
