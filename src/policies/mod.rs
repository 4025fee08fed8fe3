//! Action policies: independent rules that each either produce an
//! action or decline. The tier handler chains them in the order the
//! situation demands.

pub mod buffs;
pub mod spells;
pub mod survival;
pub mod utility;
