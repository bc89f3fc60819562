//! Transfer Operations - moving extensions onto a successor host
//!
//! The successor must already have had its registration event, so its map
//! holds whatever defaults subscribers attached. Transferred extensions then
//! overwrite those defaults by name.

use super::transfer_data::TransferReport;
use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::extension_map::load_with_rollback;
use crate::extension::Extension;
use crate::holder::ExtensionHolder;
use crate::host::HostRef;

/// Move every transferable extension from `old` onto `new`
///
/// With `keep_original == false` each source extension is left cleared. A
/// failing extension is restored on `old`, reported, and skipped; the rest
/// still transfer. Non-transferable extensions are reported as discarded.
pub fn transfer_extensions<O, N>(
    old: &mut O,
    new: &mut N,
    keep_original: bool,
) -> ExtensionResult<TransferReport>
where
    O: ExtensionHolder + ?Sized,
    N: ExtensionHolder + ?Sized,
{
    let from = old.host_ref();
    let to = new.host_ref();

    if !new.extensions().registration_fired() {
        log::error!(
            "[Transfer] Refusing transfer {} -> {}: successor was never registered",
            from,
            to
        );
        return Err(ExtensionError::RegistrationNotFired { host: to });
    }

    let mut report = TransferReport::new(from.clone(), to.clone());
    let mut produced = Vec::new();

    for extension in old.extensions_mut().all_mut() {
        let name = extension.name().to_string();
        match transfer_one(&mut **extension, &to, keep_original) {
            None => report.discarded.push(name),
            Some(Ok(copy)) => produced.push(copy),
            Some(Err(err)) => {
                log::error!(
                    "[Transfer] Extension '{}' failed to transfer {} -> {}: {}",
                    name,
                    from,
                    to,
                    err
                );
                report.failed.push((name, err));
            }
        }
    }

    for copy in produced {
        let name = copy.name().to_string();
        if new.extensions_mut().insert_or_replace(copy).is_some() {
            log::debug!("[Transfer] '{}' replaced the default on {}", name, to);
            report.overwritten.push(name.clone());
        }
        report.transferred.push(name);
    }

    carry_retained(old, new, keep_original, &mut report);

    log::info!(
        "[Transfer] {} -> {}: {} transferred, {} discarded, {} retained, {} failed",
        from,
        to,
        report.transferred.len(),
        report.discarded.len(),
        report.retained.len(),
        report.failed.len()
    );

    new.on_extensions_transferred(&from, &report);
    Ok(report)
}

/// Hand the old host's retained data to the successor
///
/// Data for a name the successor has attached is loaded into that extension;
/// everything else stays retained on the successor for its next save. Names
/// still attached on the old host are skipped since their live state already
/// went through transfer. With `keep_original == false` the old host's copy
/// is cleared.
fn carry_retained<O, N>(old: &mut O, new: &mut N, keep_original: bool, report: &mut TransferReport)
where
    O: ExtensionHolder + ?Sized,
    N: ExtensionHolder + ?Sized,
{
    let orphans = if keep_original {
        old.extensions().retained().clone()
    } else {
        old.extensions_mut().clear_retained()
    };

    let map = new.extensions_mut();
    for (name, tag) in orphans {
        // A live extension on the old host already shadows its retained copy
        if old.extensions().contains(&name) {
            continue;
        }
        if let Some(extension) = map.get_mut(&name) {
            match load_with_rollback(extension, &tag) {
                Ok(()) => {
                    report.retained.push(name);
                    continue;
                }
                Err(err) => log::warn!(
                    "[Transfer] '{}' on {} rejected retained data: {}; keeping it retained",
                    name,
                    report.to,
                    err
                ),
            }
        }
        log::debug!("[Transfer] Carrying retained data '{}' to {}", name, report.to);
        map.retain_orphan(&name, tag);
        report.retained.push(name);
    }
}

/// Transfer a single extension
///
/// Returns `None` when the extension has no transfer capability. On failure
/// the source is restored from a snapshot taken before the attempt, so it is
/// never left half-migrated, whether or not the original was to be kept.
fn transfer_one(
    extension: &mut dyn Extension,
    to: &HostRef,
    keep_original: bool,
) -> Option<ExtensionResult<Box<dyn Extension>>> {
    let transferable = extension.as_transferable()?;
    let name = transferable.name().to_string();
    let snapshot = transferable.serialize();

    let result = transferable
        .transfer(to, keep_original)
        .and_then(|copy| {
            if copy.name() == name {
                Ok(copy)
            } else {
                Err(ExtensionError::TransferNameMismatch {
                    expected: name.clone(),
                    found: copy.name().to_string(),
                })
            }
        });

    if result.is_err() {
        if let Err(err) = transferable.deserialize(&snapshot) {
            log::error!(
                "[Transfer] Could not restore '{}' after failed transfer: {}",
                name,
                err
            );
        }
    }

    Some(result)
}
