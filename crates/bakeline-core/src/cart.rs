//! # Cart Reducer
//!
//! The billing counter builds a bill as a series of actions applied to a
//! [`CartState`]. Every applied action is written through to a
//! [`SessionStore`] so a reload of the billing screen picks up where it
//! left off.
//!
//! ## Action Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Browser ── CartAction ──► CartSession::dispatch                        │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                      next = reduce(state, action)                       │
//! │                                 │                                       │
//! │                       ┌─────────┴─────────┐                             │
//! │                       │ Err               │ Ok                          │
//! │                       ▼                   ▼                             │
//! │               state unchanged     store.save(id, next)                  │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                                     state = next                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by product code (adding again merges the quantity)
//! - Every line quantity is between 1 and [`MAX_ITEM_QUANTITY`]
//! - At most [`MAX_CART_ITEMS`] distinct products

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::gst::{price_lines, DocumentTotals};
use crate::money::Money;
use crate::types::{Draft, LineInput, Product, TaxMode, TaxRate};
use crate::validation;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// State
// =============================================================================

/// A product line in the cart.
///
/// Description, rate and tax are frozen when the product is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_code: String,
    pub description: String,
    pub hsn_code: String,
    pub rate: Money,
    pub tax_rate: TaxRate,
    pub quantity: i64,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_code: product.code.clone(),
            description: product.description.clone(),
            hsn_code: product.hsn_code.clone(),
            rate: product.rate(),
            tax_rate: product.tax_rate(),
            quantity,
        }
    }

    pub fn to_line_input(&self) -> LineInput {
        LineInput {
            product_code: self.product_code.clone(),
            description: self.description.clone(),
            hsn_code: self.hsn_code.clone(),
            quantity: self.quantity,
            rate: self.rate,
            tax_rate: self.tax_rate,
        }
    }
}

/// Customer picked for the bill being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartCustomer {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub customer: Option<CartCustomer>,
    /// Number shown on the billing screen; previewed, not yet allocated.
    #[serde(default)]
    pub bill_number: Option<String>,
}

/// Everything the billing screen can do to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartAction {
    /// Adds a line, merging quantity into an existing line for the same code.
    AddProduct { line: CartLine },
    #[serde(rename_all = "camelCase")]
    RemoveProduct { product_code: String },
    /// Sets a line's quantity; zero removes the line.
    #[serde(rename_all = "camelCase")]
    UpdateQuantity { product_code: String, quantity: i64 },
    SetCustomer { customer: Option<CartCustomer> },
    #[serde(rename_all = "camelCase")]
    SetBillNumber { bill_number: Option<String> },
    /// Merges a parked draft into the cart.
    LoadDraft { draft: CartState },
    Clear,
}

impl CartState {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn line(&self, product_code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_code == product_code)
    }

    pub fn to_line_inputs(&self) -> Vec<LineInput> {
        self.lines.iter().map(CartLine::to_line_input).collect()
    }

    /// Rebuilds the cart line by line so it obeys the same rules as one built
    /// through actions. Repeated product codes merge.
    pub fn normalized(&self) -> CoreResult<CartState> {
        let mut next = CartState {
            lines: Vec::with_capacity(self.lines.len()),
            customer: self.customer.clone(),
            bill_number: self.bill_number.clone(),
        };
        for line in &self.lines {
            next.add_line(line.clone())?;
        }
        Ok(next)
    }

    /// Totals as they would print on a bill without discount or advance.
    pub fn totals(&self, mode: TaxMode) -> CoreResult<DocumentTotals> {
        let lines = price_lines(&self.to_line_inputs(), mode)?;
        DocumentTotals::compute(&lines, Money::zero(), Money::zero())
    }

    /// Applies `action` in place.
    ///
    /// On error the state may be partially modified; use [`reduce`] to keep
    /// the previous state intact.
    pub fn apply(&mut self, action: CartAction) -> CoreResult<()> {
        match action {
            CartAction::AddProduct { line } => self.add_line(line),
            CartAction::RemoveProduct { product_code } => self.remove_line(&product_code),
            CartAction::UpdateQuantity {
                product_code,
                quantity,
            } => self.update_quantity(&product_code, quantity),
            CartAction::SetCustomer { customer } => {
                self.customer = customer;
                Ok(())
            }
            CartAction::SetBillNumber { bill_number } => {
                self.bill_number = bill_number;
                Ok(())
            }
            CartAction::LoadDraft { draft } => {
                for line in draft.lines {
                    self.add_line(line)?;
                }
                if draft.customer.is_some() {
                    self.customer = draft.customer;
                }
                Ok(())
            }
            CartAction::Clear => {
                *self = CartState::default();
                Ok(())
            }
        }
    }

    fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        validation::validate_quantity(line.quantity)?;
        validation::validate_rate(line.rate)?;
        validation::validate_tax_rate_bps(line.tax_rate.bps())?;

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_code == line.product_code)
        {
            let merged = existing.quantity + line.quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    fn remove_line(&mut self, product_code: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_code != product_code);
        if self.lines.len() == before {
            return Err(CoreError::NotInCart(product_code.to_string()));
        }
        Ok(())
    }

    fn update_quantity(&mut self, product_code: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_code);
        }
        validation::validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_code == product_code)
            .ok_or_else(|| CoreError::NotInCart(product_code.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }
}

impl Draft {
    /// Decodes the parked cart.
    pub fn cart_state(&self) -> CoreResult<CartState> {
        serde_json::from_str(&self.payload).map_err(|e| CoreError::CorruptDraft(e.to_string()))
    }
}

/// Returns the state after `action`, leaving `state` untouched.
pub fn reduce(state: &CartState, action: CartAction) -> CoreResult<CartState> {
    let mut next = state.clone();
    next.apply(action)?;
    Ok(next)
}

// =============================================================================
// Session Store
// =============================================================================

/// Where cart state is mirrored between requests.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> CoreResult<Option<CartState>>;
    fn save(&self, session_id: &str, state: &CartState) -> CoreResult<()>;
    fn remove(&self, session_id: &str) -> CoreResult<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self, session_id: &str) -> CoreResult<Option<CartState>> {
        (**self).load(session_id)
    }

    fn save(&self, session_id: &str, state: &CartState) -> CoreResult<()> {
        (**self).save(session_id, state)
    }

    fn remove(&self, session_id: &str) -> CoreResult<()> {
        (**self).remove(session_id)
    }
}

/// Keeps serialized sessions in a map. Gone when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CoreError::SessionStore("session map lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> CoreResult<Option<CartState>> {
        match self.entries()?.get(session_id) {
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| CoreError::CorruptDraft(e.to_string())),
            None => Ok(None),
        }
    }

    fn save(&self, session_id: &str, state: &CartState) -> CoreResult<()> {
        let json =
            serde_json::to_string(state).map_err(|e| CoreError::SessionStore(e.to_string()))?;
        self.entries()?.insert(session_id.to_string(), json);
        Ok(())
    }

    fn remove(&self, session_id: &str) -> CoreResult<()> {
        self.entries()?.remove(session_id);
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// A cart bound to its session store.
#[derive(Debug)]
pub struct CartSession<S: SessionStore> {
    id: String,
    store: S,
    state: CartState,
}

impl<S: SessionStore> CartSession<S> {
    /// Restores the session from `store`, or starts an empty cart.
    pub fn open(id: impl Into<String>, store: S) -> CoreResult<Self> {
        let id = id.into();
        let state = store.load(&id)?.unwrap_or_default();
        Ok(CartSession { id, store, state })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Applies `action` and writes the new state through to the store.
    ///
    /// Nothing changes when the action is rejected or the write fails.
    pub fn dispatch(&mut self, action: CartAction) -> CoreResult<&CartState> {
        let next = reduce(&self.state, action)?;
        self.store.save(&self.id, &next)?;
        self.state = next;
        Ok(&self.state)
    }

    /// Drops the cart and its stored copy.
    pub fn discard(mut self) -> CoreResult<()> {
        self.state = CartState::default();
        self.store.remove(&self.id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(code: &str, qty: i64) -> CartLine {
        CartLine {
            product_code: code.to_string(),
            description: format!("Item {}", code),
            hsn_code: "1905".to_string(),
            rate: Money::from_rupees(50),
            tax_rate: TaxRate::from_bps(500),
            quantity: qty,
        }
    }

    fn add(code: &str, qty: i64) -> CartAction {
        CartAction::AddProduct {
            line: line(code, qty),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let state = reduce(&CartState::default(), add("BUN", 2)).unwrap();
        let state = reduce(&state, add("BUN", 3)).unwrap();
        let state = reduce(&state, add("CAKE", 1)).unwrap();

        assert_eq!(state.item_count(), 2);
        assert_eq!(state.line("BUN").unwrap().quantity, 5);
        assert_eq!(state.total_quantity(), 6);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let state = reduce(&CartState::default(), add("BUN", 2)).unwrap();
        let state = reduce(
            &state,
            CartAction::UpdateQuantity {
                product_code: "BUN".to_string(),
                quantity: 0,
            },
        )
        .unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_unknown_product_is_rejected() {
        let state = CartState::default();
        let result = reduce(
            &state,
            CartAction::RemoveProduct {
                product_code: "NOPE".to_string(),
            },
        );
        assert!(matches!(result, Err(CoreError::NotInCart(_))));

        let result = reduce(
            &state,
            CartAction::UpdateQuantity {
                product_code: "NOPE".to_string(),
                quantity: 4,
            },
        );
        assert!(matches!(result, Err(CoreError::NotInCart(_))));
    }

    #[test]
    fn test_quantity_limits() {
        assert!(reduce(&CartState::default(), add("BUN", 0)).is_err());
        assert!(reduce(&CartState::default(), add("BUN", -1)).is_err());

        let state = reduce(&CartState::default(), add("BUN", MAX_ITEM_QUANTITY)).unwrap();
        let result = reduce(&state, add("BUN", 1));
        assert!(matches!(result, Err(CoreError::QuantityTooLarge { .. })));
    }

    #[test]
    fn test_cart_item_limit() {
        let mut state = CartState::default();
        for i in 0..MAX_CART_ITEMS {
            state.apply(add(&format!("P{}", i), 1)).unwrap();
        }
        let result = reduce(&state, add("ONE-MORE", 1));
        assert!(matches!(result, Err(CoreError::CartTooLarge { .. })));
    }

    #[test]
    fn test_load_draft_merges_lines_and_customer() {
        let state = reduce(&CartState::default(), add("BUN", 2)).unwrap();
        let draft = CartState {
            lines: vec![line("BUN", 1), line("PUFF", 4)],
            customer: Some(CartCustomer {
                code: None,
                name: "Asha".to_string(),
                phone: "9876543210".to_string(),
            }),
            bill_number: Some("INV000009".to_string()),
        };

        let state = reduce(&state, CartAction::LoadDraft { draft }).unwrap();

        assert_eq!(state.line("BUN").unwrap().quantity, 3);
        assert_eq!(state.line("PUFF").unwrap().quantity, 4);
        assert_eq!(state.customer.as_ref().unwrap().name, "Asha");
        assert_eq!(state.bill_number, None);
    }

    #[test]
    fn test_normalized_merges_and_checks_lines() {
        let raw = CartState {
            lines: vec![line("BUN", 1), line("PUFF", 4), line("BUN", 2)],
            customer: None,
            bill_number: Some("INV000003".to_string()),
        };
        let cart = raw.normalized().unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.line("BUN").unwrap().quantity, 3);
        assert_eq!(cart.bill_number.as_deref(), Some("INV000003"));

        let negative = CartState {
            lines: vec![line("BUN", -3)],
            ..CartState::default()
        };
        assert!(matches!(negative.normalized(), Err(CoreError::Validation(_))));

        let mut pricey = line("CAKE", 1);
        pricey.rate = Money::from_paise(i64::MAX / 2);
        let pricey = CartState {
            lines: vec![pricey],
            ..CartState::default()
        };
        assert!(matches!(pricey.normalized(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = reduce(&CartState::default(), add("BUN", 2)).unwrap();
        state.bill_number = Some("INV000001".to_string());
        let state = reduce(&state, CartAction::Clear).unwrap();
        assert_eq!(state, CartState::default());
    }

    #[test]
    fn test_totals_inclusive() {
        // 2 × ₹50 inclusive of 5% → ₹100 total
        let state = reduce(&CartState::default(), add("BUN", 2)).unwrap();
        let totals = state.totals(TaxMode::Inclusive).unwrap();
        assert_eq!(totals.total, Money::from_rupees(100));
        assert_eq!(totals.subtotal.paise(), 9_524);
    }

    #[test]
    fn test_action_json_shape() {
        let json = r#"{"type":"update_quantity","productCode":"BUN","quantity":3}"#;
        let action: CartAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            CartAction::UpdateQuantity {
                product_code: "BUN".to_string(),
                quantity: 3
            }
        );

        let clear: CartAction = serde_json::from_str(r#"{"type":"clear"}"#).unwrap();
        assert_eq!(clear, CartAction::Clear);
    }

    #[test]
    fn test_session_writes_through_and_restores() {
        let store = Arc::new(MemorySessionStore::new());

        let mut session = CartSession::open("counter-1", store.clone()).unwrap();
        session.dispatch(add("BUN", 2)).unwrap();
        session.dispatch(add("CAKE", 1)).unwrap();

        let reopened = CartSession::open("counter-1", store.clone()).unwrap();
        assert_eq!(reopened.state().item_count(), 2);
        assert_eq!(reopened.state(), session.state());

        let other = CartSession::open("counter-2", store).unwrap();
        assert!(other.state().is_empty());
    }

    #[test]
    fn test_rejected_action_leaves_session_unchanged() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = CartSession::open("counter-1", store.clone()).unwrap();
        session.dispatch(add("BUN", 2)).unwrap();

        assert!(session
            .dispatch(CartAction::RemoveProduct {
                product_code: "NOPE".to_string()
            })
            .is_err());

        assert_eq!(session.state().item_count(), 1);
        let stored = store.load("counter-1").unwrap().unwrap();
        assert_eq!(stored.item_count(), 1);
    }

    #[test]
    fn test_discard_removes_stored_copy() {
        let store = Arc::new(MemorySessionStore::new());
        let mut session = CartSession::open("counter-1", store.clone()).unwrap();
        session.dispatch(add("BUN", 2)).unwrap();
        session.discard().unwrap();

        assert!(store.load("counter-1").unwrap().is_none());
    }
}
