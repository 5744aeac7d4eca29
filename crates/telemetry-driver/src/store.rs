//! 模块存储
//!
//! 按模块索引保存每个模块最近一次的电压/温度读数，与轮次边界无关。
//! 从不清空：当前轮次未收到的模块仍保留上一轮的值。

use crate::DriverError;

/// 单个模块的最近读数
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleReading {
    /// 电压（V）
    pub voltage: f64,
    /// 温度（°C）
    pub temperature: f64,
}

/// 定长模块存储
#[derive(Debug, Clone)]
pub struct ModuleStore {
    slots: Box<[Option<ModuleReading>]>,
}

impl ModuleStore {
    /// 创建空存储（所有槽位未设置）
    pub fn new(module_count: usize) -> Self {
        Self {
            slots: vec![None; module_count].into_boxed_slice(),
        }
    }

    /// 覆盖写入一个槽位
    ///
    /// # 错误
    /// - `DriverError::ModuleIndexOutOfRange`: 索引越界，存储保持不变
    pub fn update(
        &mut self,
        module_index: usize,
        voltage: f64,
        temperature: f64,
    ) -> Result<(), DriverError> {
        let module_count = self.slots.len();
        let slot = self
            .slots
            .get_mut(module_index)
            .ok_or(DriverError::ModuleIndexOutOfRange {
                index: module_index,
                module_count,
            })?;
        *slot = Some(ModuleReading {
            voltage,
            temperature,
        });
        Ok(())
    }

    /// 读取一个槽位
    pub fn get(&self, module_index: usize) -> Option<ModuleReading> {
        self.slots.get(module_index).copied().flatten()
    }

    /// 只读视图
    pub fn slots(&self) -> &[Option<ModuleReading>] {
        &self.slots
    }

    /// 模块总数
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 已有读数的模块数
    pub fn reported_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// 拍摄快照（独立于后续更新）
    pub fn snapshot(&self) -> ModuleSnapshot {
        ModuleSnapshot {
            readings: self.slots.to_vec(),
        }
    }
}

/// 模块存储快照
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleSnapshot {
    readings: Vec<Option<ModuleReading>>,
}

impl ModuleSnapshot {
    pub fn get(&self, module_index: usize) -> Option<ModuleReading> {
        self.readings.get(module_index).copied().flatten()
    }

    pub fn readings(&self) -> &[Option<ModuleReading>] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_unset() {
        let store = ModuleStore::new(36);
        assert_eq!(store.len(), 36);
        assert_eq!(store.reported_count(), 0);
        assert!(store.slots().iter().all(Option::is_none));
    }

    #[test]
    fn test_update_overwrites() {
        let mut store = ModuleStore::new(4);
        store.update(2, 3.7, 25.0).unwrap();
        store.update(2, 3.9, 26.5).unwrap();
        assert_eq!(
            store.get(2),
            Some(ModuleReading {
                voltage: 3.9,
                temperature: 26.5,
            })
        );
        assert_eq!(store.reported_count(), 1);
    }

    #[test]
    fn test_update_out_of_range_is_rejected() {
        let mut store = ModuleStore::new(4);
        store.update(3, 3.7, 25.0).unwrap();

        let err = store.update(4, 9.9, 99.0).unwrap_err();
        assert!(matches!(
            err,
            DriverError::ModuleIndexOutOfRange {
                index: 4,
                module_count: 4
            }
        ));
        // 没有回绕写入其他槽位
        assert_eq!(store.get(0), None);
        assert_eq!(store.get(3).map(|r| r.voltage), Some(3.7));
        assert_eq!(store.get(4), None);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = ModuleStore::new(2);
        store.update(0, 3.7, 20.0).unwrap();
        let snapshot = store.snapshot();
        store.update(0, 4.0, 30.0).unwrap();

        assert_eq!(snapshot.get(0).map(|r| r.voltage), Some(3.7));
        assert_eq!(snapshot.get(1), None);
        assert_eq!(snapshot.len(), 2);
    }
}
