// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

pub mod client;
pub mod qblast;
pub mod request;
pub mod result;
pub mod xml;
