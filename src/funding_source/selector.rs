//! Keeps track of which funding source should pay for the expense being entered.

use crate::{
    Error,
    funding_source::{FundingSource, FundingSourceId, rank},
};

/// The candidate funding sources for a new expense and the one currently selected.
///
/// Every change to the sources or the amount ranks the sources again and
/// checks that the selection can still pay for the expense.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingSourceSelector {
    sources: Vec<FundingSource>,
    amount: f64,
    ranked: Vec<FundingSource>,
    selected: Option<FundingSource>,
}

impl FundingSourceSelector {
    /// Rank `sources` for `amount` and select the first ranked source, if any.
    pub fn new(sources: Vec<FundingSource>, amount: f64) -> Self {
        let ranked = rank(&sources, amount);
        let selected = ranked.first().cloned();

        Self {
            sources,
            amount,
            ranked,
            selected,
        }
    }

    /// Replace the candidate sources, e.g. after they were reloaded from the database.
    ///
    /// The selection is kept, with its latest data, if it is still ranked.
    /// Otherwise the first ranked source is selected.
    pub fn set_sources(&mut self, sources: Vec<FundingSource>) {
        self.sources = sources;
        self.ranked = rank(&self.sources, self.amount);

        let refreshed = self.selected.as_ref().and_then(|selected| {
            self.ranked
                .iter()
                .find(|source| source.id == selected.id)
                .cloned()
        });

        self.selected = refreshed.or_else(|| self.ranked.first().cloned());
    }

    /// Change the expense amount.
    ///
    /// If `amount` is not a positive number the selection is only filled
    /// when nothing is selected. Otherwise the selection is kept while it
    /// can cover `amount`, and replaced by the first ranked source that can
    /// when it cannot.
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
        self.ranked = rank(&self.sources, amount);

        if amount.is_nan() || amount <= 0.0 {
            if self.selected.is_none() {
                self.selected = self.ranked.first().cloned();
            }

            return;
        }

        let still_covers = self
            .selected
            .as_ref()
            .is_some_and(|selected| selected.available_balance >= amount);

        if !still_covers {
            self.selected = self
                .ranked
                .iter()
                .find(|source| source.available_balance >= amount)
                .cloned();
        }
    }

    /// Select the ranked source with `id`.
    ///
    /// # Errors
    /// Returns [Error::FundingSourceNotFound] if no ranked source has `id`.
    /// The current selection is left unchanged.
    pub fn select(&mut self, id: FundingSourceId) -> Result<(), Error> {
        let source = self
            .ranked
            .iter()
            .find(|source| source.id == id)
            .ok_or(Error::FundingSourceNotFound(id))?;

        self.selected = Some(source.clone());

        Ok(())
    }

    /// The candidate sources in ranked order.
    pub fn ranked(&self) -> &[FundingSource] {
        &self.ranked
    }

    /// The selected source, if any.
    pub fn selected(&self) -> Option<&FundingSource> {
        self.selected.as_ref()
    }

    /// The current expense amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether an expense for the current amount can be paid with the selection.
    pub fn can_submit(&self) -> bool {
        let valid_amount = self.amount.is_finite() && self.amount > 0.0;

        valid_amount
            && self
                .selected
                .as_ref()
                .is_some_and(|selected| selected.available_balance >= self.amount)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        funding_source::{FundingSource, FundingSourceId},
    };

    use super::FundingSourceSelector;

    fn account(id: i64, balance: f64, last_used_at: Option<i64>) -> FundingSource {
        FundingSource {
            id: FundingSourceId::Account(id),
            name: format!("Account {id}"),
            available_balance: balance,
            last_used_at,
            usage_count: 0,
        }
    }

    fn selected_id(selector: &FundingSourceSelector) -> Option<FundingSourceId> {
        selector.selected().map(|source| source.id)
    }

    #[test]
    fn new_selects_first_ranked_source() {
        let selector = FundingSourceSelector::new(
            vec![account(1, 10.0, None), account(2, 50.0, Some(1))],
            0.0,
        );

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(2)));
        assert_eq!(selector.ranked().len(), 2);
    }

    #[test]
    fn new_with_no_eligible_sources_selects_nothing() {
        let selector = FundingSourceSelector::new(vec![account(1, 0.0, None)], 0.0);

        assert!(selector.ranked().is_empty());
        assert_eq!(selector.selected(), None);
        assert!(!selector.can_submit());
    }

    #[test]
    fn keeps_selection_while_it_covers_amount() {
        let mut selector = FundingSourceSelector::new(
            vec![account(1, 500.0, Some(2)), account(2, 100.0, Some(1))],
            0.0,
        );
        selector.select(FundingSourceId::Account(2)).unwrap();

        selector.set_amount(100.0);

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(2)));
        assert!(selector.can_submit());
    }

    #[test]
    fn replaces_selection_that_cannot_cover_amount() {
        let mut selector = FundingSourceSelector::new(
            vec![account(1, 500.0, Some(2)), account(2, 100.0, Some(1))],
            0.0,
        );
        selector.select(FundingSourceId::Account(2)).unwrap();

        selector.set_amount(150.0);

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(1)));
    }

    #[test]
    fn clears_selection_when_nothing_covers_amount() {
        let mut selector = FundingSourceSelector::new(vec![account(1, 100.0, None)], 0.0);

        selector.set_amount(1000.0);

        assert_eq!(selector.selected(), None);
        assert!(!selector.can_submit());
    }

    #[test]
    fn invalid_amount_only_fills_empty_selection() {
        let mut selector = FundingSourceSelector::new(vec![account(1, 100.0, None)], 1000.0);
        assert_eq!(selector.selected(), None);

        selector.set_amount(f64::NAN);

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(1)));
        assert!(!selector.can_submit());
    }

    #[test]
    fn invalid_amount_keeps_existing_selection() {
        let mut selector = FundingSourceSelector::new(
            vec![account(1, 500.0, Some(2)), account(2, 100.0, Some(1))],
            0.0,
        );
        selector.select(FundingSourceId::Account(2)).unwrap();

        selector.set_amount(-5.0);

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(2)));
    }

    #[test]
    fn select_rejects_unranked_source() {
        let mut selector =
            FundingSourceSelector::new(vec![account(1, 100.0, None), account(2, 0.0, None)], 0.0);

        let got = selector.select(FundingSourceId::Account(2));

        assert_eq!(
            got,
            Err(Error::FundingSourceNotFound(FundingSourceId::Account(2)))
        );
        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(1)));
    }

    #[test]
    fn set_sources_refreshes_kept_selection() {
        let mut selector = FundingSourceSelector::new(
            vec![account(1, 500.0, Some(2)), account(2, 100.0, Some(1))],
            0.0,
        );
        selector.select(FundingSourceId::Account(2)).unwrap();

        selector.set_sources(vec![account(1, 500.0, Some(2)), account(2, 80.0, Some(3))]);

        let selected = selector.selected().unwrap();
        assert_eq!(selected.id, FundingSourceId::Account(2));
        assert_eq!(selected.available_balance, 80.0);
    }

    #[test]
    fn set_sources_falls_back_to_first_ranked() {
        let mut selector = FundingSourceSelector::new(
            vec![account(1, 500.0, Some(2)), account(2, 100.0, Some(1))],
            0.0,
        );
        selector.select(FundingSourceId::Account(2)).unwrap();

        selector.set_sources(vec![account(1, 500.0, Some(2))]);

        assert_eq!(selected_id(&selector), Some(FundingSourceId::Account(1)));
    }

    #[test]
    fn can_submit_requires_positive_amount() {
        let mut selector = FundingSourceSelector::new(vec![account(1, 100.0, None)], 0.0);
        assert!(!selector.can_submit());

        selector.set_amount(25.0);
        assert!(selector.can_submit());
        assert_eq!(selector.amount(), 25.0);

        selector.set_amount(f64::INFINITY);
        assert!(!selector.can_submit());
    }
}
