/*
    This file is part of the relay-director workspace.

    relay-director is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    relay-director is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with relay-director. If not, see <https://www.gnu.org/licenses/>.
*/

//! Swaps bytes between little-endian wire order and the host's native
//! endianness. The wire format is little-endian regardless of host.

#[cfg(target_endian = "big")]
pub fn swap_le_16(v: u16) -> u16 {
    v.swap_bytes()
}

#[cfg(target_endian = "big")]
pub fn swap_le_32(v: u32) -> u32 {
    v.swap_bytes()
}

#[cfg(target_endian = "big")]
pub fn swap_le_64(v: u64) -> u64 {
    v.swap_bytes()
}

#[cfg(target_endian = "little")]
pub fn swap_le_16(v: u16) -> u16 {
    v
}

#[cfg(target_endian = "little")]
pub fn swap_le_32(v: u32) -> u32 {
    v
}

#[cfg(target_endian = "little")]
pub fn swap_le_64(v: u64) -> u64 {
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_endian = "little")]
    fn noop_on_little_endian_host() {
        assert_eq!(swap_le_16(1000), 1000);
        assert_eq!(swap_le_32(100_000_000), 100_000_000);
        assert_eq!(swap_le_64(100_000_000_000_000_000), 100_000_000_000_000_000);
    }

    #[test]
    #[cfg(target_endian = "big")]
    fn swaps_on_big_endian_host() {
        assert_eq!(swap_le_16(1000), 59395);
        assert_eq!(swap_le_32(100_000_000), 14808325);
        assert_eq!(swap_le_64(100_000_000_000_000_000), 152134054404865);
    }
}
