// ─── options.txt Merge ───
// Applies the server's recommended options onto the player's own file
// without reordering it or dropping settings the server does not mention.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::core::error::{UpdaterError, UpdaterResult};

/// List-valued key; merged as a set union instead of overwritten.
pub const RESOURCE_PACKS: &str = "resourcePacks";
/// Scalar key always taken from the server.
pub const LANG: &str = "lang";

/// Parse `key:value` lines. The value is everything after the first `:`;
/// lines without one are ignored.
pub fn parse_options(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Merge `remote` options into `local`, returning the new local text.
///
/// Local line order is kept and local-only keys are left verbatim. Keys the
/// server sets are overwritten in place, except `resourcePacks`, which
/// becomes the local list followed by remote entries it did not have yet.
/// Keys only the server has are not added.
pub fn merge_options(remote: &str, local: &str) -> UpdaterResult<String> {
    let remote = parse_options(remote);
    let newline = if local.contains("\r\n") { "\r\n" } else { "\n" };

    let mut lines = Vec::new();
    for line in local.lines() {
        let Some((key, value)) = line.split_once(':') else {
            lines.push(line.to_string());
            continue;
        };

        let merged = match (key, remote.get(key)) {
            (RESOURCE_PACKS, Some(remote_packs)) => merge_pack_list(value, remote_packs)?
                .map(|packs| format!("{}:{}", key, escape_non_ascii(&packs))),
            (_, Some(remote_value)) => Some(format!("{}:{}", key, escape_non_ascii(remote_value))),
            (_, None) => None,
        };

        match merged {
            Some(merged) => {
                if merged != line {
                    debug!("options.txt: {} -> {}", line, merged);
                }
                lines.push(merged);
            }
            None => lines.push(line.to_string()),
        }
    }

    let mut out = lines.join(newline);
    out.push_str(newline);
    Ok(out)
}

/// Union of two JSON string lists, local entries first. `None` when the
/// remote list adds nothing.
fn merge_pack_list(local: &str, remote: &str) -> UpdaterResult<Option<String>> {
    let mut packs = parse_pack_list(local)?;
    let novel: Vec<String> = parse_pack_list(remote)?
        .into_iter()
        .filter(|p| !packs.contains(p))
        .fold(Vec::new(), |mut acc, p| {
            if !acc.contains(&p) {
                acc.push(p);
            }
            acc
        });

    if novel.is_empty() {
        return Ok(None);
    }
    packs.extend(novel);

    let quoted = packs
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(format!("[{}]", quoted.join(","))))
}

fn parse_pack_list(value: &str) -> UpdaterResult<Vec<String>> {
    serde_json::from_str(value.trim())
        .map_err(|e| UpdaterError::Options(format!("{RESOURCE_PACKS} is not a string list: {e}")))
}

/// Replace every non-ASCII character and `&` with a `\uXXXX` escape
/// (UTF-16 units, lower-case hex), which is how the game writes them.
pub fn escape_non_ascii(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii() && c != '&' {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Merge the remote options file at `remote` into `local`, in place.
pub async fn merge_options_file(remote: &Path, local: &Path) -> UpdaterResult<()> {
    let remote_text = tokio::fs::read_to_string(remote)
        .await
        .map_err(|e| UpdaterError::io(remote, e))?;
    let local_text = tokio::fs::read_to_string(local)
        .await
        .map_err(|e| UpdaterError::io(local, e))?;

    let merged = merge_options(&remote_text, &local_text)?;

    tokio::fs::write(local, merged)
        .await
        .map_err(|e| UpdaterError::io(local, e))
}
