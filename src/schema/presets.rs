//! 画质预设：命令名 → 目标值。按光照模式区分两套表。

use crate::schema::catalog::LIGHTING_STYLE_STATIC;

pub const PRESET_NAMES: [&str; 4] = ["low", "medium", "high", "ultra"];

pub type PresetTable = &'static [(&'static str, &'static str)];

/// 预设选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingMode {
    Dynamic,
    Static,
}

impl LightingMode {
    pub fn from_value(value: &str) -> Self {
        if value == LIGHTING_STYLE_STATIC {
            LightingMode::Static
        } else {
            LightingMode::Dynamic
        }
    }
}

/// 按名称和模式取预设表；未知名称回退到 medium
pub fn table(name: &str, mode: LightingMode) -> PresetTable {
    match (name.to_lowercase().as_str(), mode) {
        ("low", LightingMode::Dynamic) => DYNAMIC_LOW,
        ("high", LightingMode::Dynamic) => DYNAMIC_HIGH,
        ("ultra", LightingMode::Dynamic) => DYNAMIC_ULTRA,
        (_, LightingMode::Dynamic) => DYNAMIC_MEDIUM,
        ("low", LightingMode::Static) => STATIC_LOW,
        ("high", LightingMode::Static) => STATIC_HIGH,
        ("ultra", LightingMode::Static) => STATIC_ULTRA,
        (_, LightingMode::Static) => STATIC_MEDIUM,
    }
}

const DYNAMIC_LOW: PresetTable = &[
    ("texture_lod", "2"),
    ("r__tf_mipbias", "0.0"),
    ("r__tf_aniso", "4"),
    ("r3_msaa", "st_opt_off"),
    ("r2_smaa", "low"),
    ("r3_ssfx_taa", "false"),
    // 草：值越大越稀疏
    ("r__detail_density", "0.9"),
    ("r__detail_radius", "70"),
    ("r2_slight_fade", "0.5"),
    ("r2_ls_squality", "0.5"),
    ("r__actor_shadow", "false"),
    ("r2_sun_quality", "st_opt_low"),
    ("r2_ssao", "st_opt_off"),
    ("r2_ssao_mode", "ssdo"),
    ("r2_sunshafts_mode", "off"),
    ("r2_volumetric_lights", "false"),
    ("r4_point_light_shadows", "false"),
    ("r3_ssfx_shadows", "false"),
    ("r4_material_style", "st_opt_classic"),
    ("r2_detail_bump", "false"),
    ("r2_steep_parallax", "false"),
    ("r4_enable_tessellation", "false"),
    ("r2_soft_particles", "false"),
    ("r2_dof_enable", "false"),
    ("r2_soft_water", "false"),
    ("r3_ssfx_water", "false"),
    ("r3_dynamic_wet_surfaces", "false"),
    ("r3_ssfx_fog", "false"),
    ("r3_volumetric_smoke", "false"),
    ("r3_gi", "false"),
];

const DYNAMIC_MEDIUM: PresetTable = &[
    ("texture_lod", "1"),
    ("r__tf_mipbias", "0.0"),
    ("r__tf_aniso", "8"),
    ("r3_msaa", "st_opt_off"),
    ("r2_smaa", "medium"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.6"),
    ("r__detail_radius", "100"),
    ("r2_slight_fade", "0.7"),
    ("r2_ls_squality", "0.5"),
    ("r__actor_shadow", "true"),
    ("r2_sun_quality", "st_opt_medium"),
    ("r2_ssao", "st_opt_low"),
    ("r2_ssao_mode", "ssdo"),
    ("r2_sunshafts_mode", "volumetric"),
    ("r2_volumetric_lights", "true"),
    ("r4_point_light_shadows", "false"),
    ("r3_ssfx_shadows", "false"),
    ("r4_material_style", "st_opt_classic"),
    ("r2_detail_bump", "true"),
    ("r2_steep_parallax", "false"),
    ("r4_enable_tessellation", "false"),
    ("r2_soft_particles", "true"),
    ("r2_dof_enable", "false"),
    ("r2_soft_water", "true"),
    ("r3_ssfx_water", "false"),
    ("r3_dynamic_wet_surfaces", "true"),
    ("r3_ssfx_fog", "false"),
    ("r3_volumetric_smoke", "true"),
    ("r3_gi", "false"),
];

const DYNAMIC_HIGH: PresetTable = &[
    ("texture_lod", "0"),
    ("r__tf_mipbias", "-0.5"),
    ("r__tf_aniso", "16"),
    ("r3_msaa", "2x"),
    ("r2_smaa", "high"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.4"),
    ("r__detail_radius", "150"),
    ("r2_slight_fade", "1.0"),
    ("r2_ls_squality", "1.0"),
    ("r__actor_shadow", "true"),
    ("r2_sun_quality", "st_opt_high"),
    ("r2_ssao", "st_opt_medium"),
    ("r2_ssao_mode", "gtao"),
    ("r2_sunshafts_mode", "volumetric"),
    ("r2_volumetric_lights", "true"),
    ("r4_point_light_shadows", "true"),
    ("r3_ssfx_shadows", "true"),
    ("r4_material_style", "st_opt_pbr"),
    ("r2_detail_bump", "true"),
    ("r2_steep_parallax", "true"),
    ("r4_enable_tessellation", "true"),
    ("r2_soft_particles", "true"),
    ("r2_dof_enable", "true"),
    ("r2_soft_water", "true"),
    ("r3_ssfx_water", "true"),
    ("r3_dynamic_wet_surfaces", "true"),
    ("r3_ssfx_fog", "true"),
    ("r3_volumetric_smoke", "true"),
    ("r3_gi", "false"),
];

const DYNAMIC_ULTRA: PresetTable = &[
    ("texture_lod", "0"),
    ("r__tf_mipbias", "-0.5"),
    ("r__tf_aniso", "16"),
    ("r3_msaa", "4x"),
    ("r2_smaa", "ultra"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.2"),
    ("r__detail_radius", "200"),
    ("r2_slight_fade", "1.0"),
    ("r2_ls_squality", "1.0"),
    ("r__actor_shadow", "true"),
    ("r2_sun_quality", "st_opt_extreme"),
    ("r2_ssao", "st_opt_high"),
    ("r2_ssao_mode", "gtao"),
    ("r2_sunshafts_mode", "combined"),
    ("r2_volumetric_lights", "true"),
    ("r4_point_light_shadows", "true"),
    ("r3_ssfx_shadows", "true"),
    ("r4_material_style", "st_opt_pbr"),
    ("r2_detail_bump", "true"),
    ("r2_steep_parallax", "true"),
    ("r4_enable_tessellation", "true"),
    ("r2_soft_particles", "true"),
    ("r2_dof_enable", "true"),
    ("r2_soft_water", "true"),
    ("r3_ssfx_water", "true"),
    ("r3_dynamic_wet_surfaces", "true"),
    ("r3_ssfx_fog", "true"),
    ("r3_volumetric_smoke", "true"),
    ("r3_gi", "true"),
];

// 静态光照下很多选项被隐藏，表更短

const STATIC_LOW: PresetTable = &[
    ("r4_static_lighting_quality", "st_opt_low"),
    ("texture_lod", "2"),
    ("r__tf_mipbias", "0.0"),
    ("r__tf_aniso", "4"),
    ("r3_msaa", "st_opt_off"),
    ("r2_smaa", "low"),
    ("r3_ssfx_taa", "false"),
    ("r__detail_density", "0.9"),
    ("r__detail_radius", "70"),
    ("r2_slight_fade", "0.5"),
    ("r2_ls_squality", "0.5"),
    ("r__actor_shadow", "false"),
    ("r3_volumetric_smoke", "false"),
];

const STATIC_MEDIUM: PresetTable = &[
    ("r4_static_lighting_quality", "st_opt_medium"),
    ("texture_lod", "1"),
    ("r__tf_mipbias", "0.0"),
    ("r__tf_aniso", "8"),
    ("r3_msaa", "st_opt_off"),
    ("r2_smaa", "medium"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.6"),
    ("r__detail_radius", "100"),
    ("r2_slight_fade", "0.7"),
    ("r2_ls_squality", "0.5"),
    ("r__actor_shadow", "true"),
    ("r3_volumetric_smoke", "true"),
];

const STATIC_HIGH: PresetTable = &[
    ("r4_static_lighting_quality", "st_opt_high"),
    ("texture_lod", "0"),
    ("r__tf_mipbias", "-0.5"),
    ("r__tf_aniso", "16"),
    ("r3_msaa", "2x"),
    ("r2_smaa", "high"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.4"),
    ("r__detail_radius", "150"),
    ("r2_slight_fade", "1.0"),
    ("r2_ls_squality", "1.0"),
    ("r__actor_shadow", "true"),
    ("r3_volumetric_smoke", "true"),
];

const STATIC_ULTRA: PresetTable = &[
    // 静态光照没有 ultra 档
    ("r4_static_lighting_quality", "st_opt_high"),
    ("texture_lod", "0"),
    ("r__tf_mipbias", "-0.5"),
    ("r__tf_aniso", "16"),
    ("r3_msaa", "4x"),
    ("r2_smaa", "ultra"),
    ("r3_ssfx_taa", "true"),
    ("r__detail_density", "0.2"),
    ("r__detail_radius", "200"),
    ("r2_slight_fade", "1.0"),
    ("r2_ls_squality", "1.0"),
    ("r__actor_shadow", "true"),
    ("r3_volumetric_smoke", "true"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;

    #[test]
    fn test_unknown_preset_falls_back_to_medium() {
        assert_eq!(table("nope", LightingMode::Dynamic), DYNAMIC_MEDIUM);
        assert_eq!(table("HIGH", LightingMode::Static), STATIC_HIGH);
    }

    #[test]
    fn test_mode_from_value() {
        assert_eq!(LightingMode::from_value("st_opt_static"), LightingMode::Static);
        assert_eq!(LightingMode::from_value("st_opt_dynamic"), LightingMode::Dynamic);
        assert_eq!(LightingMode::from_value("garbage"), LightingMode::Dynamic);
    }

    #[test]
    fn test_builtin_catalog_covers_every_preset_command() {
        let schema = catalog::builtin();
        for name in PRESET_NAMES {
            for mode in [LightingMode::Dynamic, LightingMode::Static] {
                for (command, _) in table(name, mode) {
                    assert!(
                        schema.find_by_command(command).is_some(),
                        "preset {name} references unknown command {command}"
                    );
                }
            }
        }
    }
}
