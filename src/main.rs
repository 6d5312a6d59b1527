// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use homsearch::errors::HomologyError;

fn main() -> Result<(), HomologyError> {
    homsearch::run()
}
