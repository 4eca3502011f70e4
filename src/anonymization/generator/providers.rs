//! Type-specific synthetic value providers
//!
//! Each provider draws from the document's seeded RNG, so the sequence of
//! values is reproducible for a given seed. Providers return `None` when they
//! cannot produce a value; the generator then falls back to a redacted
//! placeholder.

use crate::anonymization::models::EntityType;
use chrono::{Days, NaiveDate};
use fake::faker::address::en::{BuildingNumber, CityName, StateName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;

/// Replacement rule selected from an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementKind {
    /// Full human name
    Person,
    /// Company-style name
    Organization,
    /// City name
    Location,
    /// Street line; city and state of the original are kept
    Address,
    /// `(NXX) NXX-XXXX`
    Phone,
    /// Syntactically valid email
    Email,
    /// `AAA-GG-SSSS`
    Ssn,
    /// ISO calendar date
    Date,
    /// `{d}:{yy}-cv-{nnnnn}`
    CaseNumber,
    /// `Superior Court of {state}`
    CourtName,
    /// `{letter}{7 digits}`
    DriverLicense,
    /// 16-digit Luhn-valid number
    CreditCard,
    /// Dotted IPv4
    IpAddress,
    /// No dedicated rule
    Redacted,
}

impl ReplacementKind {
    /// Dispatch table from entity type to rule
    pub fn for_entity(entity_type: &EntityType) -> Self {
        match entity_type.as_str() {
            EntityType::PERSON => Self::Person,
            EntityType::ORGANIZATION => Self::Organization,
            EntityType::LOCATION => Self::Location,
            EntityType::ADDRESS => Self::Address,
            EntityType::PHONE_NUMBER => Self::Phone,
            EntityType::EMAIL_ADDRESS => Self::Email,
            EntityType::US_SSN => Self::Ssn,
            EntityType::DATE_TIME => Self::Date,
            EntityType::CASE_NUMBER => Self::CaseNumber,
            EntityType::COURT_NAME => Self::CourtName,
            EntityType::US_DRIVER_LICENSE => Self::DriverLicense,
            EntityType::CREDIT_CARD => Self::CreditCard,
            EntityType::IP_ADDRESS => Self::IpAddress,
            _ => Self::Redacted,
        }
    }

    /// Generate a value of this kind
    ///
    /// [`ReplacementKind::Redacted`] always yields `None`; the caller owns the
    /// placeholder fallback.
    pub fn generate<R: Rng + ?Sized>(self, rng: &mut R) -> Option<String> {
        match self {
            Self::Person => Some(Name().fake_with_rng(rng)),
            Self::Organization => Some(CompanyName().fake_with_rng(rng)),
            Self::Location => Some(CityName().fake_with_rng(rng)),
            Self::Address => Some(street_line(rng)),
            Self::Phone => Some(phone_number(rng)),
            Self::Email => Some(SafeEmail().fake_with_rng(rng)),
            Self::Ssn => Some(ssn(rng)),
            Self::Date => calendar_date(rng),
            Self::CaseNumber => Some(case_number(rng)),
            Self::CourtName => {
                let state: String = StateName().fake_with_rng(rng);
                Some(format!("Superior Court of {state}"))
            }
            Self::DriverLicense => Some(driver_license(rng)),
            Self::CreditCard => Some(credit_card(rng)),
            Self::IpAddress => Some(ipv4(rng)),
            Self::Redacted => None,
        }
    }

    /// Generate a value standing in for `original`
    ///
    /// Addresses keep the jurisdiction of `original` (city, state and the
    /// first two ZIP digits) and replace the street, unit and ZIP tail.
    /// Every other kind ignores `original`.
    pub fn generate_for<R: Rng + ?Sized>(self, original: &str, rng: &mut R) -> Option<String> {
        match self {
            Self::Address => Some(street_address(original, rng)),
            other => other.generate(rng),
        }
    }
}

const UNIT_PREFIXES: [&str; 7] = ["Apt", "Suite", "Ste", "Unit", "Floor", "Fl", "#"];

fn street_line<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    format!("{number} {street}")
}

fn street_address<R: Rng + ?Sized>(original: &str, rng: &mut R) -> String {
    let trimmed = original.trim().trim_end_matches([',', '.']);

    let (rest, zip) = match trimmed.rsplit_once(|c: char| c == ' ' || c == ',') {
        Some((head, last)) if is_zip(last) => (head.trim_end_matches([',', ' ']), Some(last)),
        _ => (trimmed, None),
    };

    // Street first, then optional unit, city and state segments
    let jurisdiction: Vec<&str> = rest
        .split(',')
        .skip(1)
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && !is_unit(segment))
        .collect();

    let mut address = street_line(rng);
    if jurisdiction.is_empty() {
        return address;
    }

    address.push_str(", ");
    address.push_str(&jurisdiction.join(", "));
    if let Some(zip) = zip {
        address.push(' ');
        address.push_str(&fake_zip(zip, rng));
    }
    address
}

fn is_unit(segment: &str) -> bool {
    UNIT_PREFIXES.iter().any(|prefix| {
        segment
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphabetic()))
    })
}

fn is_zip(token: &str) -> bool {
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    match token.split_once('-') {
        Some((head, tail)) => digits(head, 5) && digits(tail, 4),
        None => digits(token, 5),
    }
}

fn fake_zip<R: Rng + ?Sized>(zip: &str, rng: &mut R) -> String {
    let region = zip.get(..2).unwrap_or("00");
    let local = rng.gen_range(0..1000);
    format!("{region}{local:03}")
}

fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    // NANP: area code and exchange never start with 0 or 1
    let area = rng.gen_range(200..=999);
    let exchange = rng.gen_range(200..=999);
    let line = rng.gen_range(0..=9999);
    format!("({area}) {exchange}-{line:04}")
}

fn ssn<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut area = rng.gen_range(1..=899);
    if area == 666 {
        area = 667;
    }
    let group = rng.gen_range(1..=99);
    let serial = rng.gen_range(1..=9999);
    format!("{area:03}-{group:02}-{serial:04}")
}

fn calendar_date<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    // Roughly 1970 through 2025
    let offset = rng.gen_range(0..20_454u64);
    let date = epoch.checked_add_days(Days::new(offset))?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn case_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let district = rng.gen_range(1..=9);
    let year = rng.gen_range(20..=25);
    let sequence = rng.gen_range(100..=99_999);
    format!("{district}:{year:02}-cv-{sequence:05}")
}

fn driver_license<R: Rng + ?Sized>(rng: &mut R) -> String {
    let letter = char::from(rng.gen_range(b'A'..=b'Z'));
    let number = rng.gen_range(1_000_000..=9_999_999);
    format!("{letter}{number}")
}

fn credit_card<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Visa-style prefix, 15 payload digits, 1 check digit
    let mut digits: Vec<u8> = vec![4];
    digits.extend((0..14).map(|_| rng.gen_range(0..=9u8)));
    let check = luhn_check_digit(&digits);
    digits.push(check);
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn ipv4<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = rng.gen_range(1..=223u8);
    let rest: [u8; 3] = rng.gen();
    format!("{first}.{}.{}.{}", rest[0], rest[1], rest[2])
}

/// Luhn check digit for a payload (check digit not included)
pub fn luhn_check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = u32::from(d);
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Validate a digit string with the Luhn checksum
pub fn is_luhn_valid(number: &str) -> bool {
    let digits: Option<Vec<u8>> = number
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect();
    match digits {
        Some(digits) if digits.len() >= 2 => {
            let (payload, check) = digits.split_at(digits.len() - 1);
            luhn_check_digit(payload) == check[0]
        }
        _ => false,
    }
}
