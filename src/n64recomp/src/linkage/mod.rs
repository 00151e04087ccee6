// SPDX-License-Identifier: MIT

//! The two cross-function artifacts the driver writes once per binary: a
//! forward-declaration header and the vram -> function-pointer lookup
//! table, ordered deterministically so rebuilds diff cleanly.

mod header;
mod lookup;

pub use header::emit_header;
pub use lookup::emit_lookup_table;
