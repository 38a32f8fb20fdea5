// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error type shared by every stage of a marshal or unmarshal call.
//!
//! Every error aborts the whole call. The engine never hands back a partially
//! built graph, so callers should read any `Err` as "nothing was produced".

use std::borrow::Cow;

use thiserror::Error;

use crate::types::TypeDescriptor;

/// Set WEAVE_PANIC_ON_ERROR=1 at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("WEAVE_PANIC_ON_ERROR").is_some();

/// Check if WEAVE_PANIC_ON_ERROR environment variable is set.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for Weave marshalling and unmarshalling.
///
/// # IMPORTANT: Always Use Static Constructor Functions
///
/// Do not construct variants with the enum syntax. Use the constructor functions
/// ([`Error::unconvertible_type`], [`Error::forbidden_type`], ...) so that
/// `WEAVE_PANIC_ON_ERROR` can stop the program at the exact creation site.
///
/// ```rust
/// use weave_core::error::Error;
/// use weave_core::types::TypeDescriptor;
///
/// let err = Error::forbidden_type(TypeDescriptor::new("com.acme.Exploit"));
/// assert!(err.is_forbidden());
/// let err = Error::malformed_tree(format!("unknown field `{}`", "nmae"));
/// ```
///
/// ## Debug Mode: WEAVE_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 WEAVE_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No converter in the registry matches the runtime type of a value.
    ///
    /// Do not construct this variant directly; use [`Error::unconvertible_type`] instead.
    #[error("no converter matches type `{0}`")]
    UnconvertibleType(TypeDescriptor),

    /// The permission gate refused to reconstruct a type.
    ///
    /// Do not construct this variant directly; use [`Error::forbidden_type`] instead.
    #[error("type `{0}` is not permitted for reconstruction")]
    ForbiddenType(TypeDescriptor),

    /// The tree strategy re-entered an object that is still being written.
    ///
    /// Do not construct this variant directly; use [`Error::cyclic_graph`] instead.
    #[error("cycle detected at {0}; use the reference strategy to marshal cyclic graphs")]
    CyclicGraph(Cow<'static, str>),

    /// The tree does not have the shape the target converter expects.
    ///
    /// Do not construct this variant directly; use [`Error::malformed_tree`] instead.
    #[error("{0}")]
    MalformedTree(Cow<'static, str>),

    /// A back-reference never resolved to a constructed value.
    ///
    /// Do not construct this variant directly; use [`Error::unresolved_reference`] instead.
    #[error("{0}")]
    UnresolvedReference(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// The engine configuration is inconsistent (duplicate class, bad pattern, ...).
    ///
    /// Do not construct this variant directly; use [`Error::invalid_config`] instead.
    #[error("{0}")]
    InvalidConfig(Cow<'static, str>),

    /// A tree cursor was driven in a way the tree port does not support.
    ///
    /// Do not construct this variant directly; use [`Error::tree_port`] instead.
    #[error("{0}")]
    TreePort(Cow<'static, str>),

    /// Failure raised by a user supplied converter.
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl Error {
    /// Creates a new [`Error::UnconvertibleType`] for the given runtime type.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unconvertible_type(ty: TypeDescriptor) -> Self {
        let err = Error::UnconvertibleType(ty);
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::ForbiddenType`] carrying the denied descriptor.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn forbidden_type(ty: TypeDescriptor) -> Self {
        let err = Error::ForbiddenType(ty);
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::CyclicGraph`] for the path where the cycle closed.
    ///
    /// # Example
    /// ```
    /// use weave_core::error::Error;
    ///
    /// let err = Error::cyclic_graph("/node/next/next");
    /// assert!(err.to_string().contains("reference strategy"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn cyclic_graph<S: Into<Cow<'static, str>>>(path: S) -> Self {
        let err = Error::CyclicGraph(path.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::MalformedTree`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn malformed_tree<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::MalformedTree(s.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnresolvedReference`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unresolved_reference<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnresolvedReference(s.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidConfig`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_config<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidConfig(s.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TreePort`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn tree_port<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TreePort(s.into());
        if PANIC_ON_ERROR {
            panic!("WEAVE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::ForbiddenType(_))
    }

    pub fn is_unconvertible(&self) -> bool {
        matches!(self, Error::UnconvertibleType(_))
    }

    pub fn is_cyclic(&self) -> bool {
        matches!(self, Error::CyclicGraph(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedTree(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::UnresolvedReference(_))
    }

    /// The descriptor carried by type related errors.
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        match self {
            Error::UnconvertibleType(ty) | Error::ForbiddenType(ty) => Some(ty),
            _ => None,
        }
    }

    /// Appends the tree path where a malformed node was met.
    ///
    /// Other variants are returned unchanged.
    #[inline(never)]
    pub fn at_path(self, path: &str) -> Error {
        if let Error::MalformedTree(s) = self {
            if s.ends_with(')') && s.contains("(at ") {
                return Error::MalformedTree(s);
            }
            Error::malformed_tree(format!("{} (at {})", s, path))
        } else {
            self
        }
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use weave_core::ensure;
/// use weave_core::error::Error;
///
/// fn check_arity(n: u8) -> Result<(), Error> {
///     ensure!(n < 8, Error::invalid_config("too many type parameters"));
///     ensure!(n != 3, "arity {} is reserved", n);
///     Ok(())
/// }
/// assert!(check_arity(9).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::malformed_tree($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::malformed_tree(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with a [`Error::MalformedTree`].
///
/// # Examples
/// ```
/// use weave_core::bail;
/// use weave_core::error::Error;
///
/// fn reject(name: &str) -> Result<(), Error> {
///     bail!("unexpected node `{}`", name);
/// }
/// assert!(reject("foo").unwrap_err().is_malformed());
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::malformed_tree($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::malformed_tree(format!($fmt, $($arg)*)))
    };
}
