// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model shared by the editor, the session and the backends.

pub mod properties;
pub mod roi;
