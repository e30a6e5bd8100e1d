// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: media decoding, schema files and annotation backends.

pub mod backend;
pub mod http;
pub mod local;
pub mod media;
pub mod serialization;
