//! Lookup tables resolving dimension ids to names.
//!
//! Built once per normalization from the snapshot dimension collections.
//! Every key is stored already repaired.

use std::collections::HashMap;

use crate::{BudgetSnapshot, ids::repair_id};

/// Category resolved together with its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedCategory<'a> {
    pub name: &'a str,
    pub group_id: &'a str,
    pub group: &'a str,
}

#[derive(Debug, Default)]
pub(crate) struct Dimensions<'a> {
    accounts: HashMap<&'a str, &'a str>,
    payees: HashMap<&'a str, &'a str>,
    categories: HashMap<&'a str, ResolvedCategory<'a>>,
}

impl<'a> Dimensions<'a> {
    pub(crate) fn new(snapshot: &'a BudgetSnapshot) -> Self {
        let accounts = snapshot
            .accounts
            .iter()
            .map(|a| (repair_id(&a.id), a.name.as_str()))
            .collect();
        let payees = snapshot
            .payees
            .iter()
            .map(|p| (repair_id(&p.id), p.name.as_str()))
            .collect();

        let groups: HashMap<&str, &str> = snapshot
            .category_groups
            .iter()
            .map(|g| (repair_id(&g.id), g.name.as_str()))
            .collect();

        // A category without a known group does not resolve at all.
        let categories = snapshot
            .categories
            .iter()
            .filter_map(|c| {
                let group_id = repair_id(&c.category_group_id);
                let group = groups.get(group_id).copied()?;
                Some((
                    repair_id(&c.id),
                    ResolvedCategory {
                        name: c.name.as_str(),
                        group_id,
                        group,
                    },
                ))
            })
            .collect();

        Self {
            accounts,
            payees,
            categories,
        }
    }

    pub(crate) fn account(&self, id: &str) -> Option<&'a str> {
        self.accounts.get(id).copied()
    }

    pub(crate) fn payee(&self, id: &str) -> Option<&'a str> {
        self.payees.get(id).copied()
    }

    pub(crate) fn category(&self, id: &str) -> Option<ResolvedCategory<'a>> {
        self.categories.get(id).copied()
    }
}
