//! Status codes reported by secure stores.
//!
//! Values follow the platform keychain's `OSStatus` space so codes logged by
//! latch can be looked up directly.

pub const SUCCESS: i32 = 0;
pub const UNIMPLEMENTED: i32 = -4;
pub const IO: i32 = -36;
pub const PARAM: i32 = -50;
pub const NO_ACCESS_FOR_ITEM: i32 = -25243;
pub const DUPLICATE_ITEM: i32 = -25299;
pub const ITEM_NOT_FOUND: i32 = -25300;
pub const DECODE: i32 = -26275;

/// Short description for a known code.
pub const fn describe(code: i32) -> &'static str {
  match code {
    SUCCESS => "success",
    UNIMPLEMENTED => "operation not supported by this store",
    IO => "I/O error",
    PARAM => "invalid parameter",
    NO_ACCESS_FOR_ITEM => "no access for item",
    DUPLICATE_ITEM => "item already exists",
    ITEM_NOT_FOUND => "item not found",
    DECODE => "unable to decode stored data",
    _ => "unknown status",
  }
}
