//! Catalog filter state.

use fatmac_core::{CategoryId, CategoryRef, Condition, Price, VendorId, VendorRef};

use super::selection::Selection;

/// Choices offered by the filter sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<CategoryRef>,
    pub vendors: Vec<VendorRef>,
}

impl FilterOptions {
    /// Display name of a category, if it is known and named.
    #[must_use]
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .and_then(|category| category.name.as_deref())
    }

    /// Display name of a vendor, if it is known and named.
    #[must_use]
    pub fn vendor_name(&self, id: VendorId) -> Option<&str> {
        self.vendors
            .iter()
            .find(|vendor| vendor.id == id)
            .and_then(|vendor| vendor.name.as_deref())
    }
}

/// Structured filters chosen from the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub category: Selection<CategoryId>,
    pub vendor: Selection<VendorId>,
    pub condition: Selection<Condition>,
    /// Upper price bound; always positive when set.
    pub max_price: Option<Price>,
    /// Only products flagged as new arrivals.
    pub is_new: bool,
    /// Only products with a discounted price.
    pub has_discount: bool,
}

impl ProductFilters {
    /// Returns true if no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<Selection<CategoryId>>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<Selection<VendorId>>) -> Self {
        self.vendor = vendor.into();
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<Selection<Condition>>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Set the price ceiling. Zero or negative amounts clear it.
    #[must_use]
    pub fn with_max_price(mut self, max_price: Option<Price>) -> Self {
        self.max_price =
            max_price.filter(|price| price.amount().is_sign_positive() && !price.is_zero());
        self
    }

    #[must_use]
    pub const fn with_is_new(mut self, is_new: bool) -> Self {
        self.is_new = is_new;
        self
    }

    #[must_use]
    pub const fn with_has_discount(mut self, has_discount: bool) -> Self {
        self.has_discount = has_discount;
        self
    }

    /// Flip one category in or out of the selection.
    #[must_use]
    pub fn toggle_category(mut self, id: CategoryId) -> Self {
        self.category = self.category.toggled(id);
        self
    }

    /// Flip one vendor in or out of the selection.
    #[must_use]
    pub fn toggle_vendor(mut self, id: VendorId) -> Self {
        self.vendor = self.vendor.toggled(id);
        self
    }

    /// Flip one condition in or out of the selection.
    #[must_use]
    pub fn toggle_condition(mut self, condition: Condition) -> Self {
        self.condition = self.condition.toggled(condition);
        self
    }
}

impl From<CategoryId> for Selection<CategoryId> {
    fn from(id: CategoryId) -> Self {
        Self::One(id)
    }
}

impl From<VendorId> for Selection<VendorId> {
    fn from(id: VendorId) -> Self {
        Self::One(id)
    }
}

impl From<Condition> for Selection<Condition> {
    fn from(condition: Condition) -> Self {
        Self::One(condition)
    }
}

/// Everything that determines which listing page is shown.
///
/// `search` is stored trimmed; `page` is at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub filters: ProductFilters,
    pub search: String,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            filters: ProductFilters::default(),
            search: String::new(),
            page: 1,
        }
    }
}

impl FilterState {
    #[must_use]
    pub fn new(filters: ProductFilters, search: &str, page: u32) -> Self {
        Self {
            filters,
            search: search.trim().to_owned(),
            page: page.max(1),
        }
    }
}
