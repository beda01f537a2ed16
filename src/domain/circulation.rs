//! Checkout, reservation, renewal and return rules.
//!
//! The engine holds no state. Each function takes a book borrowed from the
//! [`Catalog`](crate::Catalog) for the duration of one command and either
//! moves it to its next [`BookStatus`] or leaves it untouched and reports why
//! the transition is not allowed.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::domain::{Book, BookId, BookStatus, User};

/// A circulation transition that the book's current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CirculationError {
    /// The book is out on loan.
    #[error("book {0} is not available")]
    NotAvailable(BookId),
    /// Someone already holds the book.
    #[error("book {0} is already reserved")]
    AlreadyReserved(BookId),
    /// The book is already out on loan.
    #[error("book {0} is already checked out")]
    AlreadyCheckedOut(BookId),
    /// The book is not on a dated loan to this user.
    #[error("book {0} cannot be renewed")]
    CannotRenew(BookId),
    /// There is no hold or loan to end.
    #[error("book {0} is not checked out or reserved")]
    NotCheckedOut(BookId),
}

/// Places a hold on an available book for `user`.
///
/// No due date is set; the loan starts at [`checkout`].
///
/// # Errors
///
/// - [`CirculationError::AlreadyReserved`] if the book is on hold
/// - [`CirculationError::NotAvailable`] if the book is out on loan
pub fn reserve(book: &mut Book, user: &User) -> Result<(), CirculationError> {
    match book.status {
        BookStatus::Available => {
            book.status = BookStatus::Reserved {
                holder: Some(user.name.clone()),
            };
            tracing::info!("Reserved {} for {}", book.id, user.name);
            Ok(())
        }
        BookStatus::Reserved { .. } => Err(CirculationError::AlreadyReserved(book.id.clone())),
        BookStatus::CheckedOut { .. } => Err(CirculationError::NotAvailable(book.id.clone())),
    }
}

/// Lends a book to `user`, due back `loan_period` after `today`.
///
/// A book on hold can only be collected by the user it is held for. Holds
/// without a recorded holder can be collected by anyone.
///
/// # Errors
///
/// - [`CirculationError::AlreadyReserved`] if the book is held for someone
///   else
/// - [`CirculationError::AlreadyCheckedOut`] if the book is out on loan
/// - [`CirculationError::NotAvailable`] if the due date cannot be represented
pub fn checkout(
    book: &mut Book,
    user: &User,
    loan_period: Days,
    today: NaiveDate,
) -> Result<NaiveDate, CirculationError> {
    match &book.status {
        BookStatus::Available => {}
        BookStatus::Reserved { holder } if is_holder(holder.as_deref(), user) => {}
        BookStatus::Reserved { .. } => {
            return Err(CirculationError::AlreadyReserved(book.id.clone()));
        }
        BookStatus::CheckedOut { .. } => {
            return Err(CirculationError::AlreadyCheckedOut(book.id.clone()));
        }
    }

    let due = today
        .checked_add_days(loan_period)
        .ok_or_else(|| CirculationError::NotAvailable(book.id.clone()))?;

    book.status = BookStatus::CheckedOut {
        holder: Some(user.name.clone()),
        due: Some(due),
    };
    tracing::info!("Checked out {} to {}, due {due}", book.id, user.name);

    Ok(due)
}

/// Extends a loan by `renewal_period`, counted from the current due date.
///
/// # Errors
///
/// Returns [`CirculationError::CannotRenew`] if the book is not checked out,
/// is checked out to someone else, or has no due date to extend.
pub fn renew(
    book: &mut Book,
    user: &User,
    renewal_period: Days,
) -> Result<NaiveDate, CirculationError> {
    let BookStatus::CheckedOut {
        holder,
        due: Some(due),
    } = &mut book.status
    else {
        return Err(CirculationError::CannotRenew(book.id.clone()));
    };

    if !is_holder(holder.as_deref(), user) {
        return Err(CirculationError::CannotRenew(book.id.clone()));
    }

    let renewed = due
        .checked_add_days(renewal_period)
        .ok_or_else(|| CirculationError::CannotRenew(book.id.clone()))?;
    *due = renewed;
    tracing::info!("Renewed {} for {}, now due {renewed}", book.id, user.name);

    Ok(renewed)
}

/// Ends a loan or cancels a hold, putting the book back on the shelf.
///
/// # Errors
///
/// Returns [`CirculationError::NotCheckedOut`] if the book is already
/// available.
pub fn return_book(book: &mut Book) -> Result<(), CirculationError> {
    if book.status == BookStatus::Available {
        return Err(CirculationError::NotCheckedOut(book.id.clone()));
    }
    book.status = BookStatus::Available;
    tracing::info!("Returned {}", book.id);
    Ok(())
}

/// Whether the book is on loan and its due date is before `today`.
#[must_use]
pub fn is_overdue(book: &Book, today: NaiveDate) -> bool {
    book.due_return().is_some_and(|due| due < today)
}

fn is_holder(holder: Option<&str>, user: &User) -> bool {
    holder.is_none_or(|name| name == user.name)
}
