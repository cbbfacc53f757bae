//! # Form Edit Arguments
//!
//! Translates `--set`, `--add`, `--remove` and `--upload` flags into edits
//! of an open [`FormSession`].
//!
//! Edits apply in a fixed order: removals, scalar assignments, group
//! additions, then uploads. Block slot indices given to `--upload` refer
//! to positions after the additions.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use mec_console::schema::ScalarKind;
use mec_console::{FormSession, SlotKey};

/// Field edits shared by `create` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    /// Set a scalar field, e.g. `--set client_name=Acme`.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Append a group entry, e.g. `--add client_emails=a@acme.com`.
    /// Block groups take their text fields separated by `|`:
    /// `--add "info=Heading|Details"`.
    #[arg(long = "add", value_name = "GROUP=VALUE", value_parser = parse_assignment)]
    pub add: Vec<(String, String)>,

    /// Remove a group entry by position, e.g. `--remove info=1`.
    #[arg(long = "remove", value_name = "GROUP=INDEX", value_parser = parse_removal)]
    pub remove: Vec<(String, usize)>,

    /// Upload a file into an asset slot, e.g. `--upload img=hero.png` or
    /// `--upload "info[0].img=block.png"`.
    #[arg(long = "upload", value_name = "SLOT=PATH", value_parser = parse_upload)]
    pub upload: Vec<(SlotKey, PathBuf)>,
}

impl EditArgs {
    /// Whether no edit was requested.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.remove.is_empty() && self.upload.is_empty()
    }
}

// -- Flag parsers -----------------------------------------------------------

/// Parse `key=value`. The value may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_removal(s: &str) -> Result<(String, usize), String> {
    let (group, index) = parse_assignment(s)?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("expected GROUP=INDEX, got `{s}`"))?;
    Ok((group, index))
}

fn parse_upload(s: &str) -> Result<(SlotKey, PathBuf), String> {
    let (slot, path) = parse_assignment(s)?;
    if path.trim().is_empty() {
        return Err(format!("missing file path in `{s}`"));
    }
    Ok((parse_slot(&slot)?, PathBuf::from(path)))
}

/// Parse a slot written as `name` or `group[index].field`.
pub fn parse_slot(s: &str) -> Result<SlotKey, String> {
    let Some((group, rest)) = s.split_once('[') else {
        return Ok(SlotKey::field(s));
    };
    let (index, field) = rest
        .split_once("].")
        .ok_or_else(|| format!("expected GROUP[INDEX].FIELD, got `{s}`"))?;
    let index = index
        .parse()
        .map_err(|_| format!("invalid index `{index}` in `{s}`"))?;
    if group.is_empty() || field.is_empty() {
        return Err(format!("expected GROUP[INDEX].FIELD, got `{s}`"));
    }
    Ok(SlotKey::block(group, index, field))
}

// -- Application ------------------------------------------------------------

/// Apply scalar assignments and group additions to an open form.
///
/// Removals and uploads go through the screen so that asset references
/// are released and tracked.
pub fn apply_field_edits(form: &mut FormSession, args: &EditArgs) -> Result<()> {
    for (name, raw) in &args.set {
        let value = scalar_value(form, name, raw)?;
        form.set_scalar(name, value)
            .with_context(|| format!("cannot set `{name}`"))?;
    }

    for (group, raw) in &args.add {
        add_entry(form, group, raw)?;
    }
    Ok(())
}

fn scalar_value(form: &FormSession, name: &str, raw: &str) -> Result<Value> {
    let Some(spec) = form.schema().scalar(name) else {
        bail!("{} has no field `{name}`", form.schema().kind.label());
    };
    Ok(match spec.kind {
        ScalarKind::Text => Value::String(raw.to_string()),
        ScalarKind::Flag { .. } => Value::Bool(parse_flag(raw)?),
    })
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => bail!("expected true or false, got `{other}`"),
    }
}

fn add_entry(form: &mut FormSession, group: &str, raw: &str) -> Result<()> {
    let Some(spec) = form.schema().group(group).cloned() else {
        bail!("{} has no group `{group}`", form.schema().kind.label());
    };
    let fields: Vec<&str> = spec
        .codec
        .fields()
        .iter()
        .copied()
        .filter(|f| !spec.is_asset_field(f))
        .collect();
    let parts: Vec<&str> = if fields.len() == 1 {
        vec![raw]
    } else {
        raw.split('|').collect()
    };
    if parts.len() > fields.len() {
        bail!(
            "`{group}` takes at most {} values separated by `|`",
            fields.len()
        );
    }

    // Fill the first blank entry before appending a new one.
    let blank = form
        .group(group)
        .and_then(|instances| instances.iter().position(|i| i.is_blank()));
    let index = match blank {
        Some(index) => index,
        None => form.add_group_instance(group)?,
    };
    for (field, value) in fields.iter().zip(parts) {
        form.set_group_field(group, index, field, value.trim())
            .with_context(|| format!("cannot set `{group}[{index}].{field}`"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mec_core::EntityKind;

    fn open(kind: EntityKind) -> FormSession {
        let mut form = FormSession::for_kind(kind).unwrap();
        form.open(None).unwrap();
        form
    }

    #[test]
    fn assignment_keeps_equals_in_value() {
        assert_eq!(
            parse_assignment("project_url=https://x.io/?a=b").unwrap(),
            ("project_url".to_string(), "https://x.io/?a=b".to_string())
        );
        assert!(parse_assignment("no_equals").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn slot_forms() {
        assert_eq!(parse_slot("img").unwrap(), SlotKey::field("img"));
        assert_eq!(parse_slot("info[2].img").unwrap(), SlotKey::block("info", 2, "img"));
        assert!(parse_slot("info[x].img").is_err());
        assert!(parse_slot("info[1]").is_err());
    }

    #[test]
    fn removal_needs_numeric_index() {
        assert_eq!(parse_removal("info=1").unwrap(), ("info".to_string(), 1));
        assert!(parse_removal("info=first").is_err());
    }

    #[test]
    fn client_additions_fill_blank_entries_first() {
        let mut form = open(EntityKind::Client);
        let args = EditArgs {
            set: vec![("client_name".into(), "Acme".into())],
            add: vec![
                ("companies".into(), "Acme Inc".into()),
                ("client_emails".into(), "a@acme.com".into()),
                ("client_emails".into(), "b@acme.com".into()),
            ],
            ..EditArgs::default()
        };
        apply_field_edits(&mut form, &args).unwrap();

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.get("client_name"), Some(&Value::from("Acme")));
        assert_eq!(
            payload.get("companies"),
            Some(&serde_json::json!([{"name": "Acme Inc"}]))
        );
        assert_eq!(
            payload.get("client_emails"),
            Some(&serde_json::json!(["a@acme.com", "b@acme.com"]))
        );
        assert_eq!(payload.get("client_phones"), Some(&serde_json::json!([])));
    }

    #[test]
    fn banner_flag_is_parsed() {
        let mut form = open(EntityKind::Banner);
        let args = EditArgs {
            set: vec![("is_active".into(), "no".into())],
            ..EditArgs::default()
        };
        apply_field_edits(&mut form, &args).unwrap();
        assert_eq!(form.scalar("is_active"), Some(&Value::Bool(false)));

        let bad = EditArgs {
            set: vec![("is_active".into(), "maybe".into())],
            ..EditArgs::default()
        };
        assert!(apply_field_edits(&mut form, &bad).is_err());
    }

    #[test]
    fn work_blocks_split_on_pipe() {
        let mut form = open(EntityKind::Work);
        let args = EditArgs {
            add: vec![("info".into(), "Intro | First steps".into())],
            ..EditArgs::default()
        };
        apply_field_edits(&mut form, &args).unwrap();
        let info = form.group("info").unwrap();
        assert_eq!(info[0].get("heading"), "Intro");
        assert_eq!(info[0].get("details"), "First steps");

        let too_many = EditArgs {
            add: vec![("info".into(), "a|b|c".into())],
            ..EditArgs::default()
        };
        assert!(apply_field_edits(&mut form, &too_many).is_err());
    }

    #[test]
    fn unknown_fields_are_errors() {
        let mut form = open(EntityKind::Banner);
        let args = EditArgs {
            set: vec![("colour".into(), "red".into())],
            ..EditArgs::default()
        };
        assert!(apply_field_edits(&mut form, &args).is_err());

        let args = EditArgs {
            add: vec![("tags".into(), "x".into())],
            ..EditArgs::default()
        };
        assert!(apply_field_edits(&mut form, &args).is_err());
    }
}
