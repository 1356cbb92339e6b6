// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Communication with the remote GPU tracking service.

pub mod health;
pub mod pipeline;
pub mod transport;
