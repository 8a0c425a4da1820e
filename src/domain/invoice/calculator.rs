//! Invoice totals, due dates and credit installments.
//!
//! Everything here is a pure function over the draft: no I/O, no logging and
//! no failure modes. Rows that are still being typed are skipped and
//! out-of-range numbers are coerced, so the form can call in on every
//! keystroke.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::entities::{
  Installment, InvoiceDraft, InvoicePreview, LineBreakdown, LineItem, MAX_INSTALLMENTS, Totals,
};
use super::value_objects::{DEFAULT_CREDIT_DAYS, PaymentCondition, TaxAffectationType};

const MONEY_DECIMAL_PLACES: u32 = 2;
const HUNDRED: Decimal = dec!(100);

/// Half-up rounding to cents.
pub fn round_money(value: Decimal) -> Decimal {
  let mut rounded =
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
  // Always two decimals when serialized: 118 -> "118.00"
  rounded.rescale(MONEY_DECIMAL_PLACES);
  rounded
}

/// Unrounded taxable base and tax of a billable row. `None` for rows still
/// being typed and for rows whose amounts overflow a `Decimal`.
fn line_amounts(item: &LineItem) -> Option<(Decimal, Decimal)> {
  if !item.is_billable() {
    return None;
  }

  let rate = item.tax_rate_percent.checked_div(HUNDRED)?;
  let gross = item.gross_value()?;
  let mut base = if item.price_includes_tax && item.tax_affectation.is_taxed() {
    let divisor = Decimal::ONE.checked_add(rate)?;
    if divisor.is_zero() {
      gross
    } else {
      gross.checked_div(divisor)?
    }
  } else {
    gross
  };

  if let Some(discount) = item.discount {
    base = base.checked_sub(discount)?;
  }

  let tax = if item.tax_affectation.is_taxed() {
    base.checked_mul(rate)?
  } else {
    Decimal::ZERO
  };

  // the emitted line total must fit as well
  base.checked_add(tax)?;

  Some((base, tax))
}

/// Per-row figures for display. `None` for rows the totals skip.
pub fn compute_line(item: &LineItem) -> Option<LineBreakdown> {
  line_amounts(item).map(|(base, tax)| LineBreakdown {
    base: round_money(base),
    tax: round_money(tax),
    total: round_money(base + tax),
  })
}

#[derive(Default)]
struct Accumulator {
  taxed: Decimal,
  exempt: Decimal,
  unaffected: Decimal,
  export: Decimal,
  tax: Decimal,
  subtotal: Decimal,
  total: Decimal,
}

impl Accumulator {
  /// Adds one row, or leaves every sum untouched when any of them would
  /// overflow.
  fn add(&mut self, affectation: TaxAffectationType, base: Decimal, line_tax: Decimal) {
    let bucket = match affectation {
      TaxAffectationType::Taxed => &mut self.taxed,
      TaxAffectationType::Exempt => &mut self.exempt,
      TaxAffectationType::Unaffected => &mut self.unaffected,
      TaxAffectationType::Export => &mut self.export,
    };

    let (Some(new_bucket), Some(tax), Some(subtotal), Some(total)) = (
      bucket.checked_add(base),
      self.tax.checked_add(line_tax),
      self.subtotal.checked_add(base),
      base
        .checked_add(line_tax)
        .and_then(|line| self.total.checked_add(line)),
    ) else {
      return;
    };

    *bucket = new_bucket;
    self.tax = tax;
    self.subtotal = subtotal;
    self.total = total;
  }
}

/// Classified bases, IGV and total of a draft.
///
/// Accumulation keeps full precision; only the emitted fields are rounded.
/// The global discount scales every bucket and the tax by the same factor,
/// and is ignored when the pre-discount subtotal is zero. Never panics: a
/// row whose amounts would overflow is skipped like an incomplete row.
pub fn compute_totals(draft: &InvoiceDraft) -> Totals {
  let mut sums = Accumulator::default();

  for item in &draft.line_items {
    let Some((base, line_tax)) = line_amounts(item) else {
      continue;
    };
    sums.add(item.tax_affectation, base, line_tax);
  }

  let percent = draft.global_discount_percent.clamp(Decimal::ZERO, HUNDRED);
  let mut discount = Decimal::ZERO;

  if percent > Decimal::ZERO && !sums.subtotal.is_zero() {
    // share <= 1, so every scaled value is no larger than the unscaled one
    let share = percent / HUNDRED;
    let scaled = sums.subtotal.checked_mul(share).and_then(|d| {
      let factor = Decimal::ONE - share;
      Some((
        d,
        sums.taxed.checked_mul(factor)?,
        sums.exempt.checked_mul(factor)?,
        sums.unaffected.checked_mul(factor)?,
        sums.export.checked_mul(factor)?,
        sums.tax.checked_mul(factor)?,
        sums.total.checked_mul(factor)?,
      ))
    });
    if let Some((d, taxed, exempt, unaffected, export, tax, total)) = scaled {
      discount = d;
      sums.taxed = taxed;
      sums.exempt = exempt;
      sums.unaffected = unaffected;
      sums.export = export;
      sums.tax = tax;
      sums.total = total;
    }
  }

  Totals {
    taxed_base: round_money(sums.taxed),
    exempt_base: round_money(sums.exempt),
    unaffected_base: round_money(sums.unaffected),
    export_base: round_money(sums.export),
    tax: round_money(sums.tax),
    discount: round_money(discount),
    total: round_money(sums.total),
  }
}

/// Due date implied by the payment condition, 30 days when credit names none.
pub fn derive_due_date(issue_date: NaiveDate, payment_condition: &str) -> NaiveDate {
  derive_due_date_with_default(issue_date, payment_condition, DEFAULT_CREDIT_DAYS)
}

/// A day count the calendar cannot represent falls back to the default
/// credit term.
pub fn derive_due_date_with_default(
  issue_date: NaiveDate,
  payment_condition: &str,
  default_credit_days: u32,
) -> NaiveDate {
  let add_days = |days: u32| issue_date.checked_add_days(Days::new(u64::from(days)));
  let days = PaymentCondition::parse(payment_condition).days_or(default_credit_days);
  add_days(days)
    .or_else(|| add_days(default_credit_days))
    .unwrap_or(issue_date)
}

/// Monthly schedule starting at `first_due_date`.
///
/// Every installment but the last is `round(total / count)`; the last one
/// takes whatever is left so the amounts add up to `total` exactly. Due dates
/// keep the day of month, falling back to the month's last day. `count` is
/// capped at [`MAX_INSTALLMENTS`]; a schedule running past the calendar's
/// last date is empty.
pub fn generate_installments(
  count: u32,
  total: Decimal,
  first_due_date: Option<NaiveDate>,
) -> Vec<Installment> {
  let Some(first_due_date) = first_due_date else {
    return Vec::new();
  };
  let count = count.min(MAX_INSTALLMENTS);
  if count == 0 || total <= Decimal::ZERO {
    return Vec::new();
  }

  let due_dates: Option<Vec<NaiveDate>> = (0..count)
    .map(|index| first_due_date.checked_add_months(Months::new(index)))
    .collect();
  let Some(due_dates) = due_dates else {
    return Vec::new();
  };

  let regular_amount = round_money(total / Decimal::from(count));
  let mut allocated = Decimal::ZERO;

  due_dates
    .into_iter()
    .zip(1..)
    .map(|(due_date, number)| {
      let amount = if number == count {
        total - allocated
      } else {
        regular_amount
      };
      allocated += amount;

      Installment {
        number,
        amount,
        due_date,
      }
    })
    .collect()
}

/// Everything the form shows after a change: row figures, totals, due date
/// and, on credit, the installment schedule.
pub fn preview(draft: &InvoiceDraft) -> InvoicePreview {
  preview_with_default(draft, DEFAULT_CREDIT_DAYS)
}

pub fn preview_with_default(draft: &InvoiceDraft, default_credit_days: u32) -> InvoicePreview {
  let totals = compute_totals(draft);
  let due_date = derive_due_date_with_default(
    draft.issue_date,
    &draft.payment_condition,
    default_credit_days,
  );

  let installments = if PaymentCondition::parse(&draft.payment_condition).is_credit() {
    generate_installments(draft.installment_count, totals.total, Some(due_date))
  } else {
    Vec::new()
  };

  InvoicePreview {
    lines: draft.line_items.iter().map(compute_line).collect(),
    totals,
    due_date,
    installments,
  }
}
