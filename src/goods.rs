//! Goods - the concrete item kinds a price book holds.
//!
//! `Goods` is a closed tagged union, so the binary registry, the field
//! editors and the CSV importer are all plain `match`es over a fixed set
//! of kinds. `Voucher` deliberately has no binary encoding.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::codec::{Decode, Registry};
use crate::error::{Error, Result};
use crate::item::{Encode, Item};
use crate::wire::{WireReader, WireWriter};

pub const GROCERY_TAG: &str = "grocery";
pub const GADGET_TAG: &str = "gadget";
pub const SERVICE_TAG: &str = "service";

/// Perishable food item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grocery {
    pub name: String,
    pub price: Decimal,
    pub best_before: NaiveDate,
}

/// Hardware with a warranty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gadget {
    pub name: String,
    pub price: Decimal,
    pub warranty_months: u16,
}

/// Billable work, priced per job
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub price: Decimal,
    pub hours: u16,
}

/// Prepaid credit; never written to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voucher {
    pub name: String,
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Goods {
    Grocery(Grocery),
    Gadget(Gadget),
    Service(Service),
    Voucher(Voucher),
}

impl Goods {
    pub fn grocery(name: &str, price: Decimal, best_before: NaiveDate) -> Self {
        Goods::Grocery(Grocery { name: name.to_string(), price, best_before })
    }

    pub fn gadget(name: &str, price: Decimal, warranty_months: u16) -> Self {
        Goods::Gadget(Gadget { name: name.to_string(), price, warranty_months })
    }

    pub fn service(name: &str, price: Decimal, hours: u16) -> Self {
        Goods::Service(Service { name: name.to_string(), price, hours })
    }

    pub fn voucher(name: &str, price: Decimal) -> Self {
        Goods::Voucher(Voucher { name: name.to_string(), price })
    }

    /// Lower-case kind name, as used in CSV input and listings
    pub fn kind(&self) -> &'static str {
        match self {
            Goods::Grocery(_) => GROCERY_TAG,
            Goods::Gadget(_) => GADGET_TAG,
            Goods::Service(_) => SERVICE_TAG,
            Goods::Voucher(_) => "voucher",
        }
    }

    /// Editable fields of this kind, in display order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Goods::Grocery(_) => GROCERY_FIELDS,
            Goods::Gadget(_) => GADGET_FIELDS,
            Goods::Service(_) => SERVICE_FIELDS,
            Goods::Voucher(_) => VOUCHER_FIELDS,
        }
    }

    /// Parse `value` into the field called `field`.
    ///
    /// # Errors
    /// `InvalidArgument` for an unknown field or an unparsable value; the
    /// item is unchanged then.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match self.fields().iter().find(|f| f.name == field) {
            Some(f) => (f.apply)(self, value),
            None => Err(Error::invalid_argument(format!(
                "{} has no field {:?} (expected one of: {})",
                self.kind(),
                field,
                self.fields().iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    fn name_mut(&mut self) -> &mut String {
        match self {
            Goods::Grocery(g) => &mut g.name,
            Goods::Gadget(g) => &mut g.name,
            Goods::Service(s) => &mut s.name,
            Goods::Voucher(v) => &mut v.name,
        }
    }

    fn price_mut(&mut self) -> &mut Decimal {
        match self {
            Goods::Grocery(g) => &mut g.price,
            Goods::Gadget(g) => &mut g.price,
            Goods::Service(s) => &mut s.price,
            Goods::Voucher(v) => &mut v.price,
        }
    }

    /// Kind-specific column for listings
    fn detail(&self) -> String {
        match self {
            Goods::Grocery(g) => format!("best before {}", g.best_before),
            Goods::Gadget(g) => format!("{} months warranty", g.warranty_months),
            Goods::Service(s) => format!("{} h", s.hours),
            Goods::Voucher(_) => String::new(),
        }
    }
}

impl Item for Goods {
    fn name(&self) -> &str {
        match self {
            Goods::Grocery(g) => &g.name,
            Goods::Gadget(g) => &g.name,
            Goods::Service(s) => &s.name,
            Goods::Voucher(v) => &v.name,
        }
    }

    fn price(&self) -> Decimal {
        match self {
            Goods::Grocery(g) => g.price,
            Goods::Gadget(g) => g.price,
            Goods::Service(s) => s.price,
            Goods::Voucher(v) => v.price,
        }
    }

    fn as_encode(&self) -> Option<&dyn Encode> {
        match self {
            Goods::Voucher(_) => None,
            _ => Some(self),
        }
    }
}

impl Encode for Goods {
    fn type_tag(&self) -> &'static str {
        self.kind()
    }

    fn encode(&self, out: &mut WireWriter) {
        out.put_str(self.name());
        out.put_decimal(self.price());
        match self {
            Goods::Grocery(g) => out.put_i32(g.best_before.num_days_from_ce()),
            Goods::Gadget(g) => out.put_u16(g.warranty_months),
            Goods::Service(s) => out.put_u16(s.hours),
            Goods::Voucher(_) => {}
        }
    }
}

fn decode_grocery(r: &mut WireReader<'_>) -> Result<Goods> {
    let name = r.get_str()?;
    let price = r.get_decimal()?;
    let days = r.get_i32()?;
    let best_before = NaiveDate::from_num_days_from_ce_opt(days)
        .ok_or_else(|| Error::malformed(format!("day number {} is out of range", days)))?;
    Ok(Goods::Grocery(Grocery { name, price, best_before }))
}

fn decode_gadget(r: &mut WireReader<'_>) -> Result<Goods> {
    Ok(Goods::Gadget(Gadget {
        name: r.get_str()?,
        price: r.get_decimal()?,
        warranty_months: r.get_u16()?,
    }))
}

fn decode_service(r: &mut WireReader<'_>) -> Result<Goods> {
    Ok(Goods::Service(Service {
        name: r.get_str()?,
        price: r.get_decimal()?,
        hours: r.get_u16()?,
    }))
}

impl Decode for Goods {
    fn registry() -> Registry<Self> {
        Registry::new()
            .with(GROCERY_TAG, decode_grocery)
            .with(GADGET_TAG, decode_gadget)
            .with(SERVICE_TAG, decode_service)
    }
}

impl fmt::Display for Goods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {:<24} {:>10.2}  {}", self.kind(), self.name(), self.price(), self.detail())
    }
}

// ============================================================================
// Field editors
// ============================================================================

/// One named, editable field of a goods kind.
pub struct Field {
    pub name: &'static str,
    /// Parses the text and assigns it; leaves the item alone on error
    pub apply: fn(&mut Goods, &str) -> Result<()>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

fn parse_name(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::invalid_argument("name must not be empty"));
    }
    Ok(text.to_string())
}

fn parse_price(text: &str) -> Result<Decimal> {
    let price = Decimal::from_str(text.trim())
        .map_err(|e| Error::invalid_argument(format!("price {:?}: {}", text, e)))?;
    if price < Decimal::ZERO {
        return Err(Error::invalid_argument(format!("price {} is negative", price)));
    }
    Ok(price)
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| Error::invalid_argument(format!("date {:?}: {}", text, e)))
}

fn parse_u16(text: &str, what: &str) -> Result<u16> {
    text.trim()
        .parse()
        .map_err(|e| Error::invalid_argument(format!("{} {:?}: {}", what, text, e)))
}

const NAME: Field = Field {
    name: "name",
    apply: |goods, text| {
        *goods.name_mut() = parse_name(text)?;
        Ok(())
    },
};

const PRICE: Field = Field {
    name: "price",
    apply: |goods, text| {
        *goods.price_mut() = parse_price(text)?;
        Ok(())
    },
};

const GROCERY_FIELDS: &[Field] = &[
    NAME,
    PRICE,
    Field {
        name: "best_before",
        apply: |goods, text| {
            let date = parse_date(text)?;
            if let Goods::Grocery(g) = goods {
                g.best_before = date;
            }
            Ok(())
        },
    },
];

const GADGET_FIELDS: &[Field] = &[
    NAME,
    PRICE,
    Field {
        name: "warranty_months",
        apply: |goods, text| {
            let months = parse_u16(text, "warranty")?;
            if let Goods::Gadget(g) = goods {
                g.warranty_months = months;
            }
            Ok(())
        },
    },
];

const SERVICE_FIELDS: &[Field] = &[
    NAME,
    PRICE,
    Field {
        name: "hours",
        apply: |goods, text| {
            let hours = parse_u16(text, "hours")?;
            if let Goods::Service(s) = goods {
                s.hours = hours;
            }
            Ok(())
        },
    },
];

const VOUCHER_FIELDS: &[Field] = &[NAME, PRICE];

// ============================================================================
// CSV import
// ============================================================================

/// One row of a price list: `kind,name,price,detail`.
///
/// `detail` is the best-before date (`YYYY-MM-DD`) for groceries, warranty
/// months for gadgets, hours for services, and ignored for vouchers.
#[derive(Debug, Deserialize)]
pub struct GoodsRow {
    pub kind: String,
    pub name: String,
    pub price: Decimal,
    pub detail: Option<String>,
}

impl GoodsRow {
    /// Convert the raw row into a typed item.
    pub fn to_goods(&self) -> Result<Goods> {
        let name = parse_name(&self.name)?;
        let detail = self.detail.as_deref().unwrap_or("");
        let missing = || Error::invalid_argument(format!("{} {:?} needs a detail column", self.kind, name));

        let goods = match self.kind.trim().to_ascii_lowercase().as_str() {
            GROCERY_TAG if !detail.is_empty() => Goods::grocery(&name, self.price, parse_date(detail)?),
            GADGET_TAG if !detail.is_empty() => Goods::gadget(&name, self.price, parse_u16(detail, "warranty")?),
            SERVICE_TAG if !detail.is_empty() => Goods::service(&name, self.price, parse_u16(detail, "hours")?),
            GROCERY_TAG | GADGET_TAG | SERVICE_TAG => return Err(missing()),
            "voucher" => Goods::voucher(&name, self.price),
            other => {
                return Err(Error::invalid_argument(format!("unknown kind {:?}", other)));
            }
        };
        Ok(goods)
    }
}

/// Parse a headed CSV price list.
///
/// # Errors
/// `MalformedData` naming the line for CSV syntax or type errors,
/// `InvalidArgument` for rows that parse but describe an invalid item.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Goods>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut goods = Vec::new();
    for row in rdr.deserialize::<GoodsRow>() {
        let row = row.map_err(|e| Error::malformed(format!("csv: {}", e)))?;
        goods.push(row.to_goods()?);
    }
    Ok(goods)
}
