//! Chat command glue: `raid [tier] [owner-id]`.
//!
//! Only administrators may start raids. The tier defaults to Normal and an
//! unrecognized tier name falls back to Normal with a note in the reply.

use rand::Rng;

use crate::composition::Tier;
use crate::director::{RaidDirector, RaidRequest, Trigger};
use crate::schedule::Seconds;
use crate::world::{OwnerId, WorldAdapter};

/// Chat command name.
pub const COMMAND_NAME: &str = "raid";

/// Usage line shown on bad input.
pub const USAGE: &str = "Usage: raid [easy|normal|hard|boss] [owner-id]";

/// Who issued the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandCaller {
    /// Whether the caller has administrator rights.
    pub is_admin: bool,
}

/// Severity of one reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyLevel {
    /// Neutral information.
    Info,
    /// The command succeeded.
    Success,
    /// The command failed.
    Error,
}

/// Lines to send back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Whether a raid was started.
    pub success: bool,
    /// Reply lines in order.
    pub lines: Vec<(ReplyLevel, String)>,
}

impl CommandReply {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            lines: vec![(ReplyLevel::Error, message.into())],
        }
    }
}

/// Parse and execute a raid command.
pub fn handle_raid_command<W, R>(
    director: &mut RaidDirector<R>,
    world: &mut W,
    caller: CommandCaller,
    args: &[&str],
    now: Seconds,
) -> CommandReply
where
    W: WorldAdapter + ?Sized,
    R: Rng,
{
    if !caller.is_admin {
        return CommandReply::error("You do not have permission to start raids");
    }
    if args.len() > 2 {
        return CommandReply::error(USAGE);
    }

    let mut lines = Vec::new();
    let tier = match args.first() {
        None => Tier::Normal,
        Some(name) => Tier::from_name(name).unwrap_or_else(|| {
            lines.push((
                ReplyLevel::Info,
                format!("Unknown tier '{name}', using {}", Tier::Normal),
            ));
            Tier::Normal
        }),
    };

    let request = match args.get(1) {
        None => RaidRequest::random(tier, Trigger::Command),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(id) if OwnerId(id).is_assigned() => {
                RaidRequest::against_owner(tier, OwnerId(id), Trigger::Command)
            }
            _ => return CommandReply::error(format!("Invalid owner id '{raw}'. {USAGE}")),
        },
    };

    let outcome = director.launch(world, request, now);
    let level = if outcome.is_success() {
        ReplyLevel::Success
    } else {
        ReplyLevel::Error
    };
    lines.push((level, outcome.to_string()));

    CommandReply {
        success: outcome.is_success(),
        lines,
    }
}
