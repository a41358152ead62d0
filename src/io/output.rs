// src/io/output.rs

use ndarray::Array3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::infra::constants::tolerances;
use crate::infra::error::{AtError, AtResult};

/// 随时间演化的三维温度场
///
/// 后端中性的输出口径：无论哪个模拟器产出，场数据都通过
/// 同一个访问器读取。缺失单元以 NaN 标记，由比对器负责甄别。
#[derive(Debug, Clone)]
pub struct TemperatureField {
    /// 输出时刻 [s]（升序不做强制，按文件出现顺序）
    pub times: Vec<f64>,
    /// 每个输出时刻一个 (层, 行, 列) 场
    pub data: Vec<Array3<f64>>,
}

impl TemperatureField {
    /// 从中性 CSV 场文件读取
    ///
    /// 行格式: `time,layer,row,col,temperature`（0 基索引），
    /// `#` 开头的行与表头行跳过。
    pub fn from_csv(path: &Path, dims: (usize, usize, usize)) -> AtResult<Self> {
        let file = File::open(path).map_err(|_| {
            AtError::comparator(format!("温度场输出缺失: {}", path.display()))
        })?;
        let reader = BufReader::new(file);

        let mut times: Vec<f64> = Vec::new();
        let mut data: Vec<Array3<f64>> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| AtError::io(format!("读取 {}", path.display()), e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split(',').map(|s| s.trim()).collect();
            if fields.len() != 5 {
                return Err(AtError::comparator(format!(
                    "{} 第 {} 行字段数 {} != 5",
                    path.display(),
                    line_no + 1,
                    fields.len()
                )));
            }

            // 表头行：首字段解析不出数字即跳过
            let time: f64 = match fields[0].parse() {
                Ok(t) => t,
                Err(_) => continue,
            };

            let layer: usize = parse_index(fields[1], path, line_no)?;
            let row: usize = parse_index(fields[2], path, line_no)?;
            let col: usize = parse_index(fields[3], path, line_no)?;
            let value: f64 = fields[4].parse().map_err(|_| {
                AtError::comparator(format!(
                    "{} 第 {} 行温度值无法解析: {}",
                    path.display(),
                    line_no + 1,
                    fields[4]
                ))
            })?;

            if layer >= dims.0 || row >= dims.1 || col >= dims.2 {
                return Err(AtError::comparator(format!(
                    "{} 第 {} 行单元 ({}, {}, {}) 超出网格 {:?}",
                    path.display(),
                    line_no + 1,
                    layer,
                    row,
                    col,
                    dims
                )));
            }

            let slot = match times
                .iter()
                .position(|t| (t - time).abs() < tolerances::EPSILON_TIME)
            {
                Some(idx) => idx,
                None => {
                    times.push(time);
                    data.push(Array3::from_elem(dims, f64::NAN));
                    times.len() - 1
                }
            };
            data[slot][[layer, row, col]] = value;
        }

        if times.is_empty() {
            return Err(AtError::comparator(format!(
                "温度场输出为空: {}",
                path.display()
            )));
        }

        log::debug!(
            "温度场读取完成: {} ({} 个输出时刻)",
            path.display(),
            times.len()
        );

        Ok(Self { times, data })
    }

    /// 最接近给定时刻的输出序号
    pub fn nearest_time(&self, time: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, t) in self.times.iter().enumerate() {
            let d = (t - time).abs();
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// 给定层/行，从指定列向东到域边界的温度剖面
    pub fn centerline(
        &self,
        time_index: usize,
        layer: usize,
        row: usize,
        col_start: usize,
    ) -> AtResult<Vec<f64>> {
        let field = self.data.get(time_index).ok_or_else(|| {
            AtError::comparator(format!("输出时刻序号 {} 越界", time_index))
        })?;
        let ncol = field.shape()[2];
        Ok((col_start..ncol)
            .map(|col| field[[layer, row, col]])
            .collect())
    }
}

fn parse_index(text: &str, path: &Path, line_no: usize) -> AtResult<usize> {
    text.parse().map_err(|_| {
        AtError::comparator(format!(
            "{} 第 {} 行索引无法解析: {}",
            path.display(),
            line_no + 1,
            text
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_field(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        writeln!(f, "# time,layer,row,col,temperature").unwrap();
        write!(f, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_comparator_error() {
        let err =
            TemperatureField::from_csv(Path::new("/no/such/field.csv"), (1, 1, 1)).unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, AtError::Comparator { .. }));
    }

    #[test]
    fn test_parse_two_times() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_field(
            dir.path(),
            "gwt.ucn.csv",
            "864000,0,0,0,285.0\n864000,0,0,1,284.5\n12960000,0,0,0,283.9\n12960000,0,0,1,283.1\n",
        );
        let field = TemperatureField::from_csv(&path, (1, 1, 2)).unwrap();
        assert_eq!(field.times.len(), 2);
        assert_eq!(field.nearest_time(9.0e5), Some(0));
        assert_eq!(field.nearest_time(1.0e7), Some(1));

        let profile = field.centerline(1, 0, 0, 0).unwrap();
        assert_eq!(profile, vec![283.9, 283.1]);
    }

    #[test]
    fn test_unfilled_cells_are_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_field(dir.path(), "gwt.ucn.csv", "100,0,0,0,285.0\n");
        let field = TemperatureField::from_csv(&path, (1, 1, 3)).unwrap();
        let profile = field.centerline(0, 0, 0, 0).unwrap();
        assert_eq!(profile[0], 285.0);
        assert!(profile[1].is_nan());
        assert!(profile[2].is_nan());
    }

    #[test]
    fn test_out_of_grid_cell_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_field(dir.path(), "gwt.ucn.csv", "100,0,0,5,285.0\n");
        assert!(TemperatureField::from_csv(&path, (1, 1, 3)).is_err());
    }
}
