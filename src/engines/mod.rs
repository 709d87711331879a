// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod browser_session;
pub mod page_fetcher;
pub mod rendered_source;
pub mod static_source;
pub mod traits;
pub mod validators;
