// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::category::ChartCategory;
use thiserror::Error;

/// Reasons a category's encoding cannot be built from a given shape. These
/// never leave the selector: each one triggers a degradation step instead.
#[derive(Debug, Clone, Error)]
pub enum SelectionError {
    #[error("Chart '{category}' requires a numeric column")]
    MissingNumericColumn { category: ChartCategory },

    #[error("Chart '{category}' requires a categorical column")]
    MissingCategoricalColumn { category: ChartCategory },

    #[error("Chart '{category}' requires a date-like column")]
    MissingDateColumn { category: ChartCategory },

    #[error("Result set has no columns to render")]
    NoColumns,
}
