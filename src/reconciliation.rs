// ⚖️ Reconciliation Engine - Tiered five-way partition
//
// Tiers run in strict descending priority; each tier only considers records
// not yet consumed at tier entry:
//   Tier 1: exact match on full key           → Matched Invoices
//   Tier 2: partial key + taxable delta       → Value Mismatched
//   Tier 3: invoice number + field mismatch   → Not Matching
//   Tier 4: leftover GSTR-2B records          → GSTR-Only
//   Tier 5: leftover Ledger records           → Ledger-Only
//
// A record that could match at several tiers always resolves at the earliest
// one with a valid partner and is never considered again once consumed.

use std::collections::{HashMap, HashSet};

use crate::classify;
use crate::model::{
    InvoiceRecord, MatchTier, MatchedPair, MismatchPair, Reconciliation,
};

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    /// Tolerance for taxable-value comparisons (default: 0.01). A difference
    /// of exactly this much is still a match; strictly more is a mismatch.
    pub taxable_tolerance: f64,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine {
            taxable_tolerance: classify::TAXABLE_TOLERANCE,
        }
    }

    pub fn with_tolerance(taxable_tolerance: f64) -> Self {
        ReconciliationEngine { taxable_tolerance }
    }

    /// Partition two normalized record sets into the five category tables.
    ///
    /// Consumed-set bookkeeping is local to this call: both sets start empty
    /// and are discarded with the run. Matching never fails on data content;
    /// an empty input on either side simply drains the other side into its
    /// "-only" table.
    pub fn run(&self, gstr: &[InvoiceRecord], ledger: &[InvoiceRecord]) -> Reconciliation {
        let mut consumed_gstr: HashSet<String> = HashSet::new();
        let mut consumed_ledger: HashSet<String> = HashSet::new();

        // Tier 1: exact match on full key, full cross product per key
        let mut matched = Vec::new();
        for (a, b) in cross_pairs(gstr, ledger, &consumed_gstr, &consumed_ledger, |r| {
            r.full_key.as_str()
        }) {
            matched.push(MatchedPair::new(a.clone(), b.clone(), MatchTier::Exact));
            consumed_gstr.insert(a.row_id.clone());
            consumed_ledger.insert(b.row_id.clone());
        }
        tracing::info!(pairs = matched.len(), "tier 1 (exact match) committed");

        // Tier 2: identity match on partial key, retained only when the
        // taxable values genuinely diverge
        let mut value_mismatched = Vec::new();
        for (a, b) in cross_pairs(gstr, ledger, &consumed_gstr, &consumed_ledger, |r| {
            r.partial_key.as_str()
        }) {
            if !classify::taxable_differs(a.taxable_value, b.taxable_value, self.taxable_tolerance)
            {
                continue;
            }
            value_mismatched.push(MatchedPair::new(
                a.clone(),
                b.clone(),
                MatchTier::ValueMismatch,
            ));
            consumed_gstr.insert(a.row_id.clone());
            consumed_ledger.insert(b.row_id.clone());
        }
        tracing::info!(
            pairs = value_mismatched.len(),
            "tier 2 (value mismatch) committed"
        );

        // Tier 3: invoice number alone. Grouping by the weaker key can
        // surface the same (A, B) combination more than once before the
        // consumed sets catch up; keep the first occurrence only.
        let mut not_matching = Vec::new();
        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
        for (a, b) in cross_pairs(gstr, ledger, &consumed_gstr, &consumed_ledger, |r| {
            r.invoice_number.as_str()
        }) {
            let Some(reason) = classify::mismatch_reason(a, b, self.taxable_tolerance) else {
                continue;
            };
            consumed_gstr.insert(a.row_id.clone());
            consumed_ledger.insert(b.row_id.clone());
            if !seen_pairs.insert((a.row_id.clone(), b.row_id.clone())) {
                continue;
            }
            not_matching.push(MismatchPair {
                gstr: a.clone(),
                ledger: b.clone(),
                reason,
            });
        }
        tracing::info!(
            pairs = not_matching.len(),
            "tier 3 (invoice-only mismatch) committed"
        );

        // Tiers 4/5: everything still unconsumed is one-sided
        let gstr_only: Vec<InvoiceRecord> = gstr
            .iter()
            .filter(|r| !consumed_gstr.contains(&r.row_id))
            .cloned()
            .collect();
        let ledger_only: Vec<InvoiceRecord> = ledger
            .iter()
            .filter(|r| !consumed_ledger.contains(&r.row_id))
            .cloned()
            .collect();
        tracing::info!(
            gstr_only = gstr_only.len(),
            ledger_only = ledger_only.len(),
            "unmatched remainders collected"
        );

        Reconciliation {
            matched,
            value_mismatched,
            not_matching,
            gstr_only,
            ledger_only,
        }
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GROUPED CROSS-PAIRING
// ============================================================================

/// All candidate pairs for one tier: every unconsumed A record against every
/// unconsumed B record sharing its key, A-major in input order.
///
/// Both sides are snapshotted at tier entry, so a pair committed earlier in
/// the same tier never shrinks the candidate set (this is what makes
/// duplicate keys multiply: m A-records and n B-records on one key emit all
/// m×n pairs). Consumption only takes effect at the next tier.
fn cross_pairs<'a, F>(
    gstr: &'a [InvoiceRecord],
    ledger: &'a [InvoiceRecord],
    consumed_gstr: &HashSet<String>,
    consumed_ledger: &HashSet<String>,
    key_fn: F,
) -> Vec<(&'a InvoiceRecord, &'a InvoiceRecord)>
where
    F: Fn(&InvoiceRecord) -> &str,
{
    let mut ledger_groups: HashMap<&str, Vec<&InvoiceRecord>> = HashMap::new();
    for record in ledger {
        if !consumed_ledger.contains(&record.row_id) {
            ledger_groups.entry(key_fn(record)).or_default().push(record);
        }
    }

    let mut pairs = Vec::new();
    for a in gstr {
        if consumed_gstr.contains(&a.row_id) {
            continue;
        }
        if let Some(group) = ledger_groups.get(key_fn(a)) {
            for b in group {
                pairs.push((a, *b));
            }
        }
    }
    pairs
}

// ============================================================================
// TESTS
// ============================================================================
