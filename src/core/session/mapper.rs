//! Column to channel mapping
//!
//! Channel names are column labels verbatim in one flat namespace per session.
//! Comparison is case-sensitive and nothing is renamed.

use crate::domain::errors::{NameCollisionError, PipelineError, SchemaError, SchemaErrorKind};
use crate::domain::ids::ChannelName;
use crate::domain::session::ChannelSpec;
use std::collections::HashMap;

/// Default parent group for channels
pub const DEFAULT_APPLICATION_GROUP: &str = "SessionFrame";

/// Maps columns to channel specs under one application group
///
/// # Arguments
///
/// * `columns` - `(position, label)` pairs in dataset order
/// * `group` - Parent application group of every channel
///
/// # Errors
///
/// * [`PipelineError::NameCollision`] - two labels are equal, naming both positions
/// * [`PipelineError::Schema`] - a label is blank
///
/// # Examples
///
/// ```
/// use sessionframe::core::session::map_channels;
///
/// let specs = map_channels([(0, "speed"), (1, "temp")], "Bench").unwrap();
/// assert_eq!(specs[1].identifier(), "temp:Bench");
///
/// assert!(map_channels([(0, "speed"), (1, "speed")], "Bench").is_err());
/// ```
pub fn map_channels<'a, I>(columns: I, group: &str) -> Result<Vec<ChannelSpec>, PipelineError>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut seen: HashMap<&'a str, usize> = HashMap::new();
    let mut specs = Vec::new();

    for (position, label) in columns {
        if let Some(&first_position) = seen.get(label) {
            return Err(NameCollisionError {
                name: label.to_string(),
                first_position,
                second_position: position,
            }
            .into());
        }
        seen.insert(label, position);

        let name = ChannelName::new(label)
            .map_err(|_| SchemaError::new(SchemaErrorKind::BlankColumnLabel { position }))?;

        specs.push(ChannelSpec {
            position,
            name,
            group: group.to_string(),
        });
    }

    tracing::debug!(channels = specs.len(), group = %group, "Channels mapped");
    Ok(specs)
}
