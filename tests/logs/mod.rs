//! Tests for capturing and inspecting server logs.


use super::*;
