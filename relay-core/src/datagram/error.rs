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

use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors that can occur while appending fields to a [`super::Datagram`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DatagramError {
    #[error("datagram overflow; {0}")]
    Overflow(&'static str),
}

/// Errors that can occur while reading fields out of a [`super::DatagramReader`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ReaderError {
    /// Attempted to read past the end of the datagram.
    #[error("end of datagram")]
    EndOfFile,
    #[error("could not decode bytes as UTF-8")]
    Utf8Error(String),
    #[error(transparent)]
    DatagramError(#[from] DatagramError),
}

impl From<FromUtf8Error> for ReaderError {
    fn from(value: FromUtf8Error) -> Self {
        ReaderError::Utf8Error(value.to_string())
    }
}

impl From<ReaderError> for std::io::Error {
    fn from(value: ReaderError) -> std::io::Error {
        std::io::Error::new(
            match &value {
                ReaderError::EndOfFile => std::io::ErrorKind::UnexpectedEof,
                _ => std::io::ErrorKind::InvalidData,
            },
            value.to_string(),
        )
    }
}
