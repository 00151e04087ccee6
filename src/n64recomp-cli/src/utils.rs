// SPDX-License-Identifier: MIT

use std::time;

use n64recomp::config::Endian;

#[inline]
#[must_use]
pub fn endian_to_endian(endian: object::Endianness) -> Endian {
    match endian {
        object::Endianness::Big => Endian::Big,
        object::Endianness::Little => Endian::Little,
    }
}

#[track_caller]
#[inline]
#[must_use]
pub fn get_time_now() -> time::Duration {
    time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness_maps_one_to_one() {
        assert_eq!(endian_to_endian(object::Endianness::Big), Endian::Big);
        assert_eq!(endian_to_endian(object::Endianness::Little), Endian::Little);
    }

    #[test]
    fn clock_reading_moves_forward() {
        let first = get_time_now();
        let second = get_time_now();
        assert!(second >= first);
    }
}
