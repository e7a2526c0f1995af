//! Built-in commands: store, list, get and man

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::HandlerError;
use crate::domain::entities::{CommandContext, CommandHandler, CommandRegistry, CommandSpec, Reply};
use crate::domain::traits::FileStore;

pub const STORE_DESCRIPTION: &str = "Store an attachment in the shared folder.\n\
Must provide 2 arguments: name and file type, separated by spaces.\n\
Currently only supports 1 attachment at a time.";

pub const GET_DESCRIPTION: &str = "Retrieve a file from the shared folder.\n\
Must provide at least 1 argument: the complete file name.\n\
If more than 1 argument is provided the assistant will attempt\n\
to return all files listed. Arguments must be space separated.";

pub const LIST_DESCRIPTION: &str = "List all files in the shared folder.";

pub const MAN_DESCRIPTION: &str = "List all commands and their descriptions.";

/// Build the registry of built-in commands for the given prefix
pub fn default_registry(prefix: char, storage: Arc<dyn FileStore>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register(
        CommandSpec::new(format!("{prefix}store"), Arc::new(StoreHandler::new(storage.clone())))
            .with_description(STORE_DESCRIPTION)
            .with_min_args(2),
    );
    registry.register(
        CommandSpec::new(format!("{prefix}get"), Arc::new(GetHandler::new(storage.clone())))
            .with_description(GET_DESCRIPTION)
            .with_min_args(1),
    );
    registry.register(
        CommandSpec::new(format!("{prefix}list"), Arc::new(ListHandler::new(storage)))
            .with_description(LIST_DESCRIPTION),
    );
    registry.register(
        CommandSpec::new(format!("{prefix}man"), Arc::new(ManualHandler))
            .with_description(MAN_DESCRIPTION),
    );

    registry
}

/// Reject anything that is not a plain file name inside the storage root
pub fn validate_file_name(name: &str) -> Result<(), HandlerError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0');

    if plain {
        Ok(())
    } else {
        Err(HandlerError::InvalidFileName(name.to_string()))
    }
}

/// Copies the single attachment of the message into storage as `<name>.<ext>`
pub struct StoreHandler {
    storage: Arc<dyn FileStore>,
}

impl StoreHandler {
    pub fn new(storage: Arc<dyn FileStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl CommandHandler for StoreHandler {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<Reply, HandlerError> {
        let attachment: &Path = match ctx.message.attachments.as_slice() {
            [] => return Err(HandlerError::NoAttachment),
            [single] => single.as_path(),
            many => return Err(HandlerError::TooManyAttachments(many.len())),
        };

        let file_name = format!("{}.{}", ctx.args[0], ctx.args[1]);
        validate_file_name(&file_name)?;

        let full_path = self.storage.copy_in(attachment, &file_name).await?;
        tracing::info!("Stored attachment as {}", full_path.display());

        Ok(Reply::text(format!("Saved attachment at {}", full_path.display())))
    }
}

/// Lists every file in storage with its size
pub struct ListHandler {
    storage: Arc<dyn FileStore>,
}

impl ListHandler {
    pub fn new(storage: Arc<dyn FileStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl CommandHandler for ListHandler {
    async fn handle(&self, _ctx: CommandContext<'_>) -> Result<Reply, HandlerError> {
        let files = self.storage.list().await?;

        let mut output = format!("All files in {}\n", self.storage.root().display());
        for file in files {
            output.push_str(&format!("{}, size: {}\n", file.name, file.size));
        }

        Ok(Reply::text(output))
    }
}

/// Attaches the requested files and names the ones that are missing
pub struct GetHandler {
    storage: Arc<dyn FileStore>,
}

impl GetHandler {
    pub fn new(storage: Arc<dyn FileStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl CommandHandler for GetHandler {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<Reply, HandlerError> {
        let mut attachments: Vec<PathBuf> = Vec::new();
        let mut missing: Vec<String> = Vec::new();

        for name in ctx.args {
            validate_file_name(name)?;
            if self.storage.exists(name).await {
                attachments.push(self.storage.path_of(name));
            } else {
                missing.push(format!("Unable to find {}.", name));
            }
        }

        if !missing.is_empty() {
            tracing::warn!("{} requested file(s) not found", missing.len());
        }

        Ok(Reply::text(missing.join("\n")).with_attachments(attachments))
    }
}

/// Renders the name and description of every registered command
pub struct ManualHandler;

#[async_trait]
impl CommandHandler for ManualHandler {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<Reply, HandlerError> {
        Ok(Reply::text(render_manual(ctx.registry)))
    }
}

pub fn render_manual(registry: &CommandRegistry) -> String {
    registry
        .all()
        .map(|cmd| format!("{} ---\n {}\n", cmd.name, cmd.description))
        .collect()
}
