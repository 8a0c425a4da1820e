use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::calculator;
use super::entities::{InvoiceDraft, InvoicePreview, LineItem, MAX_INSTALLMENTS, Totals};
use super::value_objects::DEFAULT_CREDIT_DAYS;

/// One invoice-form session: owns the draft and keeps the derived due date in
/// step with every edit.
#[derive(Debug, Clone)]
pub struct InvoiceForm {
  draft: InvoiceDraft,
  default_credit_days: u32,
}

impl InvoiceForm {
  pub fn new(issue_date: NaiveDate) -> Self {
    Self::with_default_credit_days(issue_date, DEFAULT_CREDIT_DAYS)
  }

  pub fn with_default_credit_days(issue_date: NaiveDate, default_credit_days: u32) -> Self {
    Self {
      draft: InvoiceDraft::new(issue_date),
      default_credit_days,
    }
  }

  pub fn draft(&self) -> &InvoiceDraft {
    &self.draft
  }

  pub fn draft_mut(&mut self) -> &mut InvoiceDraft {
    &mut self.draft
  }

  pub fn add_line_item(&mut self) -> usize {
    self.draft.line_items.push(LineItem::default());
    self.draft.line_items.len() - 1
  }

  /// Removes a row; the last remaining row is blanked instead.
  pub fn remove_line_item(&mut self, index: usize) -> bool {
    if index >= self.draft.line_items.len() {
      return false;
    }
    if self.draft.line_items.len() == 1 {
      self.draft.line_items[0] = LineItem::default();
    } else {
      self.draft.line_items.remove(index);
    }
    true
  }

  pub fn update_line_item<F>(&mut self, index: usize, edit: F) -> bool
  where
    F: FnOnce(&mut LineItem),
  {
    match self.draft.line_items.get_mut(index) {
      Some(item) => {
        edit(item);
        true
      }
      None => false,
    }
  }

  pub fn set_global_discount(&mut self, percent: Decimal) {
    self.draft.global_discount_percent = percent;
  }

  pub fn set_payment_condition(&mut self, condition: &str) {
    self.draft.payment_condition = condition.to_string();
    self.refresh_due_date();
  }

  pub fn set_issue_date(&mut self, issue_date: NaiveDate) {
    self.draft.issue_date = issue_date;
    self.refresh_due_date();
  }

  pub fn set_installment_count(&mut self, count: u32) {
    self.draft.installment_count = count.clamp(1, MAX_INSTALLMENTS);
  }

  pub fn totals(&self) -> Totals {
    calculator::compute_totals(&self.draft)
  }

  pub fn preview(&self) -> InvoicePreview {
    calculator::preview_with_default(&self.draft, self.default_credit_days)
  }

  /// Back to a blank draft, keeping the issue date.
  pub fn reset(&mut self) {
    self.draft = InvoiceDraft::new(self.draft.issue_date);
  }

  fn refresh_due_date(&mut self) {
    self.draft.due_date = calculator::derive_due_date_with_default(
      self.draft.issue_date,
      &self.draft.payment_condition,
      self.default_credit_days,
    );
  }
}
