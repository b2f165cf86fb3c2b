//! Registration hooks
//!
//! The embedding application decides when registration happens and for which
//! context. It hands a [`Manager`] and its registrars to [`run_registration`],
//! which runs every section step, then every setting step, then every control
//! step, so controls always see the sections and settings they reference.

use tracing::{debug, info};

use crate::error::Result;
use crate::registry::Manager;

/// Something that contributes sections, settings and controls to a manager.
///
/// `context` is the host's current context value (e.g. the taxonomy being
/// edited); implementations return early for contexts they don't handle.
pub trait Registrar {
    fn register_sections(&self, _manager: &mut Manager, _context: &str) -> Result<()> {
        Ok(())
    }

    fn register_settings(&self, _manager: &mut Manager, _context: &str) -> Result<()> {
        Ok(())
    }

    fn register_controls(&self, _manager: &mut Manager, _context: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Sections,
    Settings,
    Controls,
}

/// Run all registrars against `manager` for `context`.
///
/// Does nothing when the manager does not apply to `context`. Stops at the
/// first registration error.
pub fn run_registration(
    manager: &mut Manager,
    registrars: &[&dyn Registrar],
    context: &str,
) -> Result<()> {
    if !manager.applies_to(context) {
        debug!(manager = %manager.id(), context, "manager does not apply to context");
        return Ok(());
    }

    for phase in [Phase::Sections, Phase::Settings, Phase::Controls] {
        debug!(manager = %manager.id(), context, ?phase, "registration phase");
        for registrar in registrars {
            match phase {
                Phase::Sections => registrar.register_sections(manager, context)?,
                Phase::Settings => registrar.register_settings(manager, context)?,
                Phase::Controls => registrar.register_controls(manager, context)?,
            }
        }
    }

    info!(
        manager = %manager.id(),
        context,
        sections = manager.sections().count(),
        settings = manager.settings().count(),
        controls = manager.controls().count(),
        "registration complete"
    );
    Ok(())
}
