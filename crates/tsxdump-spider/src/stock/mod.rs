pub(crate) mod sql;

/// Company symbols and names from the [TSX company directory].
///
/// [TSX company directory]: https://www.tsx.com/listings/listing-with-us/listed-company-directory
pub mod tsx;

/// Industry classifications from the Globe and Mail company profile pages.
pub mod globe_and_mail;

/// Latest prices from the Yahoo Finance chart API.
pub mod yahoo_finance;

/// Quarterly and annual EPS and revenue from Google Finance income statements.
pub mod google_finance;
