// ==========================================
// 赌台荷官轮换系统 - 排班匹配
// ==========================================
// 职责: 在一批赌台与一池荷官之间确定一对一匹配
// 策略:
// - Greedy: 按赌台顺序依次取剩余池中的最高分荷官，不回溯
// - Optimal: 匈牙利算法，先最大化可开台数，再最大化总分
// 红线: 每名荷官至多匹配一张赌台；无资质的组合永不匹配
// ==========================================

use crate::config::MatchingStrategy;
use crate::domain::{Dealer, Table};
use crate::engine::selector::{DealerSelector, ScoredCandidate};
use chrono::NaiveDateTime;

/// 为每张赌台匹配荷官
///
/// # 返回
/// 与 `tables` 等长；`None` 表示该台无人可派
pub fn match_tables(
    strategy: MatchingStrategy,
    selector: &DealerSelector,
    tables: &[Table],
    pool: &[Dealer],
    as_of: NaiveDateTime,
) -> Vec<Option<ScoredCandidate>> {
    let rankings: Vec<Vec<ScoredCandidate>> = tables
        .iter()
        .map(|t| selector.rank_candidates(t, pool, as_of))
        .collect();

    match strategy {
        MatchingStrategy::Greedy => greedy(rankings, pool.len()),
        MatchingStrategy::Optimal => optimal(rankings, pool.len()),
    }
}

// ==========================================
// Greedy
// ==========================================
// 每台的排名只取决于荷官自身，故“对剩余池重新选优”等价于
// “在完整排名中取第一个未被占用的荷官”（同分仍保持池内顺序）。
fn greedy(rankings: Vec<Vec<ScoredCandidate>>, pool_len: usize) -> Vec<Option<ScoredCandidate>> {
    let mut used = vec![false; pool_len];

    rankings
        .into_iter()
        .map(|ranked| {
            let pick = ranked.into_iter().find(|c| !used[c.pool_index]);
            if let Some(c) = &pick {
                used[c.pool_index] = true;
            }
            pick
        })
        .collect()
}

// ==========================================
// Optimal
// ==========================================
fn optimal(rankings: Vec<Vec<ScoredCandidate>>, pool_len: usize) -> Vec<Option<ScoredCandidate>> {
    let rows = rankings.len();
    if rows == 0 || pool_len == 0 {
        return vec![None; rows];
    }

    // 大常数 M 保证多开一张台永远优于任意分数差
    let big_m = 1.0
        + 2.0
            * rankings
                .iter()
                .map(|r| r.iter().map(|c| c.score().abs()).fold(0.0, f64::max))
                .sum::<f64>();

    let n = rows.max(pool_len);
    let mut cost = vec![vec![0.0_f64; n]; n];
    for (i, ranked) in rankings.iter().enumerate() {
        for c in ranked {
            cost[i][c.pool_index] = -(c.score() + big_m);
        }
    }

    let assignment = hungarian(&cost);

    rankings
        .into_iter()
        .enumerate()
        .map(|(i, ranked)| {
            let col = assignment[i];
            ranked.into_iter().find(|c| c.pool_index == col)
        })
        .collect()
}

/// 匈牙利算法（最小化总代价，方阵）
///
/// 返回 row → col 的匹配
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    // 1-based 势函数写法；p[j] = 匹配到列 j 的行
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}
