//! Role-based shift exemptions.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::catalog::ShiftCatalog;
use crate::config::RotaConfig;
use crate::error::RotaError;
use crate::models::{Member, Role};

/// Resolves whether a member's role forbids a shift.
///
/// The default shift is never in any exemption set, so every member can
/// always fall back to it.
#[derive(Clone, Debug, Default)]
pub struct ExemptionPolicy {
    exempt: FxHashMap<Role, FxHashSet<String>>,
}

impl ExemptionPolicy {
    /// Build the policy from configuration, checking names against the catalog.
    pub fn from_config(config: &RotaConfig, catalog: &ShiftCatalog) -> Result<Self, RotaError> {
        let mut exempt: FxHashMap<Role, FxHashSet<String>> = FxHashMap::default();

        for (role, shift_names) in &config.exemptions {
            let entry = exempt.entry(*role).or_default();
            for name in shift_names {
                if !catalog.contains(name) {
                    return Err(RotaError::Configuration(format!(
                        "Exemption for role '{}' names unknown shift '{}'",
                        role, name
                    )));
                }
                if catalog.is_default(name) {
                    continue;
                }
                entry.insert(name.clone());
            }
        }

        Ok(Self { exempt })
    }

    /// True if `member` may never be assigned `shift_name`.
    pub fn is_exempt(&self, member: &Member, shift_name: &str) -> bool {
        self.exempt
            .get(&member.role)
            .is_some_and(|names| names.contains(shift_name))
    }

    /// True if `member` can work at least one non-default shift.
    pub fn can_rotate(&self, member: &Member, catalog: &ShiftCatalog) -> bool {
        catalog
            .special_shifts()
            .iter()
            .any(|shift| !self.is_exempt(member, &shift.name))
    }
}
