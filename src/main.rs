// Copyright 2025 the Geoedit Authors
// SPDX-License-Identifier: Apache-2.0

//! Geoedit: replay an edit script against a geometry

fn main() -> anyhow::Result<()> {
    geoedit::run()
}
