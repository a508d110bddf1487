// 🧮 Fee Aggregator - one FeeGroup per (course, fee kind)
//
// Other costs accumulate across every line item in the group. All other kinds
// keep the first non-empty line item: once the local amount is set, later
// lines of the same kind are ignored.

use crate::fees::kind::{classify, FeeKind};
use crate::source::{FeeLineItem, PartnerTerms};
use crate::text::convert_optional;
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// FEE GROUP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeGroup {
    pub course_id: String,
    pub course_name: String,
    pub university_name: String,
    pub fee_name: String,
    pub fee_kind: FeeKind,

    pub local_amount: f64,
    pub local_descriptions: Vec<String>,
    pub local_currency: String,

    pub intl_amount: f64,
    pub intl_descriptions: Vec<String>,
    pub intl_currency: String,

    pub course_duration_years: Option<f64>,
    pub partner: Option<PartnerTerms>,
}

impl FeeGroup {
    fn open(item: &FeeLineItem, fee_kind: FeeKind) -> Self {
        FeeGroup {
            course_id: item.course_id.clone(),
            course_name: item.course_name.clone(),
            university_name: item.university_name.clone(),
            fee_name: item.fee_name.clone(),
            fee_kind,
            local_amount: 0.0,
            local_descriptions: Vec::new(),
            local_currency: item.local.currency.clone(),
            intl_amount: 0.0,
            intl_descriptions: Vec::new(),
            intl_currency: item
                .international
                .as_ref()
                .map(|intl| intl.currency.clone())
                .unwrap_or_default(),
            course_duration_years: item.course_duration_years,
            partner: item.partner.clone(),
        }
    }

    fn absorb(&mut self, item: &FeeLineItem) {
        let intl = item.international.as_ref();

        if self.fee_kind == FeeKind::OtherCost {
            self.local_amount += amount_or_zero(item.local.amount);
            push_description(&mut self.local_descriptions, item.local.detail_richtext.as_deref());

            if let Some(intl) = intl {
                self.intl_amount += amount_or_zero(intl.amount);
                push_description(&mut self.intl_descriptions, intl.detail_richtext.as_deref());
            }
            return;
        }

        // First non-empty line wins
        if self.local_amount != 0.0 {
            return;
        }

        self.local_amount = amount_or_zero(item.local.amount);
        push_description(&mut self.local_descriptions, item.local.detail_richtext.as_deref());

        if let Some(intl) = intl {
            let amount = amount_or_zero(intl.amount);
            if amount != 0.0 {
                self.intl_amount = amount;
            }
            push_description(&mut self.intl_descriptions, intl.detail_richtext.as_deref());
        }
    }

    /// Local descriptions joined one per line
    pub fn local_description(&self) -> String {
        join_descriptions(&self.local_descriptions)
    }

    /// International descriptions joined one per line
    pub fn intl_description(&self) -> String {
        join_descriptions(&self.intl_descriptions)
    }
}

fn amount_or_zero(amount: Option<f64>) -> f64 {
    amount.filter(|a| a.is_finite()).unwrap_or(0.0)
}

fn push_description(descriptions: &mut Vec<String>, richtext: Option<&str>) {
    if let Some(text) = convert_optional(richtext) {
        descriptions.push(text);
    }
}

fn join_descriptions(descriptions: &[String]) -> String {
    descriptions
        .iter()
        .filter(|d| !d.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// GROUP COLLECTION
// ============================================================================

/// Insertion-ordered, read-only collection of fee groups
#[derive(Debug, Clone, Default)]
pub struct FeeGroups {
    groups: Vec<FeeGroup>,
    index: HashMap<(String, FeeKind), usize>,
}

impl FeeGroups {
    pub fn get(&self, course_id: &str, fee_kind: &FeeKind) -> Option<&FeeGroup> {
        self.index
            .get(&(course_id.to_string(), fee_kind.clone()))
            .map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeeGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn absorb(mut self, item: &FeeLineItem) -> Self {
        let fee_kind = classify(&item.fee_category_code);
        let key = (item.course_id.clone(), fee_kind.clone());

        let position = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.groups.push(FeeGroup::open(item, fee_kind));
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        self.groups[position].absorb(item);
        self
    }
}

impl IntoIterator for FeeGroups {
    type Item = FeeGroup;
    type IntoIter = std::vec::IntoIter<FeeGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group raw line items by (course, fee kind), keeping first-seen order
pub fn aggregate(items: &[FeeLineItem]) -> FeeGroups {
    items.iter().fold(FeeGroups::default(), FeeGroups::absorb)
}

// ============================================================================
// TESTS
// ============================================================================
