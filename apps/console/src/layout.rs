//! 电池包物理布局
//!
//! 控制台按电池包内的物理位置排列模块网格（6×6），与模块编号顺序无关。

/// 每行模块数
pub const ROW_WIDTH: usize = 6;

/// 在第几个模块之后打印前后半区分隔线
pub const HALF_PACK_MODULES: usize = 18;

/// 36 模块电池包的物理排列（0 起模块索引，按行）
pub const BATTERY_LAYOUT: [usize; 36] = [
    35, 34, 33, 32, 31, 30, //
    24, 25, 26, 27, 28, 29, //
    23, 22, 21, 20, 19, 18, //
    5, 4, 3, 2, 1, 0, //
    6, 7, 8, 9, 10, 11, //
    17, 16, 15, 14, 13, 12, //
];

/// 给定模块数对应的显示顺序
///
/// 只有 36 模块的电池包有已知物理布局，其它规格按编号顺序显示。
pub fn display_order(module_count: usize) -> Vec<usize> {
    if module_count == BATTERY_LAYOUT.len() {
        BATTERY_LAYOUT.to_vec()
    } else {
        (0..module_count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_permutation() {
        let mut sorted = BATTERY_LAYOUT;
        sorted.sort_unstable();
        assert_eq!(sorted.to_vec(), (0..36).collect::<Vec<_>>());
    }

    #[test]
    fn test_display_order_fallback() {
        assert_eq!(display_order(36)[0], 35);
        assert_eq!(display_order(36)[23], 0);
        assert_eq!(display_order(4), vec![0, 1, 2, 3]);
    }
}
