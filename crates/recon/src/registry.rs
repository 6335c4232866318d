//! Indexed, read-only registry snapshots.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use log::debug;
use serde::Serialize;

use crate::model::MemberRecord;

/// Exact-key indexes over one list of members.
///
/// Each index keeps the first member (in list order) for a key; later
/// duplicates are counted but never returned.
#[derive(Debug, Default)]
pub struct RegistryView {
    members: Vec<MemberRecord>,
    by_scheme_id: HashMap<String, usize>,
    by_national_id: HashMap<String, usize>,
    by_ssn: HashMap<String, usize>,
    by_contact: HashMap<u64, usize>,
    duplicate_keys: usize,
}

fn index_first<K: Eq + Hash>(map: &mut HashMap<K, usize>, key: K, idx: usize) -> bool {
    if map.contains_key(&key) {
        return false;
    }
    map.insert(key, idx);
    true
}

impl RegistryView {
    pub fn new(members: Vec<MemberRecord>) -> Self {
        let mut view = Self {
            members,
            ..Default::default()
        };
        for (idx, m) in view.members.iter().enumerate() {
            let mut dup = false;
            if !m.scheme_id.is_empty() {
                dup |= !index_first(&mut view.by_scheme_id, m.scheme_id.clone(), idx);
            }
            if !m.national_id.is_empty() {
                dup |= !index_first(&mut view.by_national_id, m.national_id.clone(), idx);
            }
            if !m.ssn.is_empty() {
                dup |= !index_first(&mut view.by_ssn, m.ssn.clone(), idx);
            }
            if let Some(c) = m.contact {
                dup |= !index_first(&mut view.by_contact, c, idx);
            }
            if dup {
                view.duplicate_keys += 1;
            }
        }
        if view.duplicate_keys > 0 {
            debug!(
                "registry view: {} member(s) share an identifier with an earlier member",
                view.duplicate_keys
            );
        }
        view
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    /// Members that lost an index slot to an earlier member with the same key.
    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }

    pub fn by_scheme_id(&self, scheme_id: &str) -> Option<&MemberRecord> {
        self.by_scheme_id.get(scheme_id).map(|&i| &self.members[i])
    }

    pub fn by_national_id(&self, national_id: &str) -> Option<&MemberRecord> {
        self.by_national_id.get(national_id).map(|&i| &self.members[i])
    }

    pub fn by_ssn(&self, ssn: &str) -> Option<&MemberRecord> {
        self.by_ssn.get(ssn).map(|&i| &self.members[i])
    }

    pub fn by_contact(&self, contact: u64) -> Option<&MemberRecord> {
        self.by_contact.get(&contact).map(|&i| &self.members[i])
    }
}

/// Employer + scheme-type selection made by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryScope {
    pub employer: String,
    pub scheme_type: String,
}

/// The two registry views the engine reconciles against.
///
/// `scoped` is filtered to the employer and scheme type and feeds the fuzzy
/// name search. `scheme_wide` is filtered to the scheme type only and feeds
/// every exact-key lookup.
#[derive(Debug, Default)]
pub struct RegistryViews {
    pub scoped: RegistryView,
    pub scheme_wide: RegistryView,
}

impl RegistryViews {
    pub fn new(scoped: Vec<MemberRecord>, scheme_wide: Vec<MemberRecord>) -> Self {
        Self {
            scoped: RegistryView::new(scoped),
            scheme_wide: RegistryView::new(scheme_wide),
        }
    }

    /// Carve both views out of a full registry dump.
    ///
    /// Employer and scheme type compare after trimming, case-sensitively, like
    /// the selection lists they come from.
    pub fn from_registry(
        members: &[MemberRecord],
        scope: &RegistryScope,
        include_closed: bool,
    ) -> Self {
        let employer = scope.employer.trim();
        let scheme_type = scope.scheme_type.trim();

        let scheme_wide: Vec<MemberRecord> = members
            .iter()
            .filter(|m| include_closed || !m.is_closed())
            .filter(|m| m.scheme_type == scheme_type)
            .cloned()
            .collect();
        let scoped: Vec<MemberRecord> = scheme_wide
            .iter()
            .filter(|m| m.employer == employer)
            .cloned()
            .collect();

        debug!(
            "registry scope employer='{employer}' scheme='{scheme_type}': {} scoped, {} scheme-wide of {}",
            scoped.len(),
            scheme_wide.len(),
            members.len()
        );

        Self::new(scoped, scheme_wide)
    }
}

/// Distinct, sorted selection values found in a registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryOptions {
    pub employers: Vec<String>,
    pub scheme_types: Vec<String>,
}

pub fn registry_options(members: &[MemberRecord]) -> RegistryOptions {
    let mut employers = BTreeSet::new();
    let mut scheme_types = BTreeSet::new();
    for m in members {
        if !m.employer.is_empty() {
            employers.insert(m.employer.clone());
        }
        if !m.scheme_type.is_empty() {
            scheme_types.insert(m.scheme_type.clone());
        }
    }
    RegistryOptions {
        employers: employers.into_iter().collect(),
        scheme_types: scheme_types.into_iter().collect(),
    }
}
