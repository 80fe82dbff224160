//! Intrinsic widths, collected during the real layout pass.
//!
//! [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)

use super::Container;
use crate::reflow_state::ReflowState;
use crate::style::ResolvedStyle;
use crate::values::clamp_width;

impl Container {
    /// Turn the accumulated content widths into border-box intrinsic
    /// widths, and the accumulated heights into the minimum height.
    pub(super) fn finish_min_max(&mut self, style: &ResolvedStyle, state: &ReflowState) {
        let mut widths = state.minmax.widths;
        let edges = style.border.horizontal() + style.padding.horizontal();

        // [§ 10.4] A fixed width is the box's intrinsic width whatever its
        // content; percentages cannot be resolved here.
        if let Some(fixed) = style.width.fixed() {
            widths.minimum = fixed;
            widths.normal_minimum = fixed;
            widths.maximum = fixed;
        }
        let clamp = |w| clamp_width(w, style.min_width, style.max_width, None);
        widths.minimum = clamp(widths.minimum);
        widths.normal_minimum = clamp(widths.normal_minimum);
        widths.maximum = clamp(widths.maximum);
        widths = widths.widened(edges);
        widths.normalize();
        debug_assert!(widths.minimum <= widths.normal_minimum && widths.normal_minimum <= widths.maximum);
        self.widths = Some(widths);

        let content = state
            .css_height
            .unwrap_or(state.minmax.min_height.max(style.min_height));
        self.min_height = content + style.border.vertical() + style.padding.vertical();
    }
}
