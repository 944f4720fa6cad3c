//! Item capability - what every stored element exposes.
//!
//! Containers never look inside an element beyond this trait: a name for
//! attribute lookup, a price for totals and price ordering, and a default
//! comparison used by `sort()`. Binary persistence is an optional extra
//! capability surfaced through [`Item::as_encode`].

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::wire::WireWriter;

/// Stable identity stamped on an element when it is added.
///
/// Assigned from a per-container counter that only ever grows, so an id
/// is never handed out twice by the same container.
pub type InsertionId = u64;

/// A named, priced element.
pub trait Item {
    /// Name used by attribute lookup and substring views
    fn name(&self) -> &str;

    /// Price; containers reject negative values on insert
    fn price(&self) -> Decimal;

    /// Natural ordering used by `sort()`: price, then name.
    fn compare(&self, other: &Self) -> Ordering
    where
        Self: Sized,
    {
        self.price()
            .cmp(&other.price())
            .then_with(|| self.name().cmp(other.name()))
    }

    /// Binary encoding capability, if this element has one.
    fn as_encode(&self) -> Option<&dyn Encode> {
        None
    }
}

/// Self-serialization capability.
///
/// The codec writes the tag and frames the payload; the element writes
/// only its own fields.
pub trait Encode {
    /// Tag the registry uses to pick a decoder on read
    fn type_tag(&self) -> &'static str;

    /// Append this element's payload
    fn encode(&self, out: &mut WireWriter);
}

/// Reject values a container must never hold.
pub(crate) fn validate<T: Item>(item: &T) -> crate::Result<()> {
    if item.price() < Decimal::ZERO {
        return Err(crate::Error::invalid_argument(format!(
            "price of {:?} is negative ({})",
            item.name(),
            item.price()
        )));
    }
    Ok(())
}
