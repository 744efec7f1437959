//! 内置选项目录。
//!
//! `video`/`sound`/`control` 页的值写入命令存储（user.ltx），
//! `gameplay`、`alife` 页的值写入结构化存储（axr_options.ltx）。

use crate::models::{OptionDefinition as Opt, OptionGroup, OptionPage, VisibilityRule};
use crate::schema::Schema;

/// 光照模式命令，同时决定预设表
pub const LIGHTING_STYLE_COMMAND: &str = "r4_lighting_style";
pub const LIGHTING_STYLE_DEFAULT: &str = "st_opt_dynamic";
pub const LIGHTING_STYLE_STATIC: &str = "st_opt_static";

pub fn builtin() -> Schema {
    Schema::new(vec![
        video_page(),
        sound_page(),
        control_page(),
        gameplay_page(),
        alife_page(),
    ])
}

fn dynamic_only() -> VisibilityRule {
    VisibilityRule::not_equals(LIGHTING_STYLE_COMMAND, LIGHTING_STYLE_STATIC)
}

fn group(id: &str, options: Vec<Opt>) -> OptionGroup {
    OptionGroup {
        id: id.to_string(),
        options,
    }
}

fn video_page() -> OptionPage {
    OptionPage {
        id: "video".to_string(),
        groups: vec![video_basic(), video_advanced()],
    }
}

fn video_basic() -> OptionGroup {
    group(
        "basic",
        vec![
            Opt::range("fov", "75", 5.0, 140.0, 1.0).command("fov").precision(0),
            Opt::range("hud_fov", "0.45", 0.1, 1.0, 0.01).command("hud_fov"),
            Opt::list("screen_mode", "borderless", &["fullscreen", "borderless", "windowed"])
                .command("rs_screenmode"),
            Opt::list(
                "lighting_style",
                LIGHTING_STYLE_DEFAULT,
                &[LIGHTING_STYLE_DEFAULT, LIGHTING_STYLE_STATIC],
            )
            .command(LIGHTING_STYLE_COMMAND),
            Opt::list(
                "static_lighting_quality",
                "st_opt_medium",
                &["st_opt_low", "st_opt_medium", "st_opt_high"],
            )
            .command("r4_static_lighting_quality")
            .visible_when(VisibilityRule::equals(LIGHTING_STYLE_COMMAND, LIGHTING_STYLE_STATIC)),
            Opt::toggle("hdr_enable", "false").command("r4_hdr10_on").one_zero(),
        ],
    )
}

fn video_advanced() -> OptionGroup {
    let sunshafts_enabled = VisibilityRule::All(vec![
        dynamic_only(),
        VisibilityRule::not_equals("r2_sunshafts_mode", "off"),
    ]);

    group(
        "advanced/main",
        vec![
            Opt::toggle("ai_torch", "true").command("ai_use_torch_dynamic_lights"),
            Opt::toggle("v_sync", "false").command("rs_v_sync"),
            Opt::range("framelimit", "0", 0.0, 500.0, 2.0)
                .command("r__framelimit")
                .precision(0),
            // 渲染距离
            Opt::title("_rendering_dist"),
            Opt::range("vis_distance", "1.0", 0.4, 1.5, 0.1).command("rs_vis_distance"),
            Opt::range("optimize_static_geom", "2", 0.0, 4.0, 1.0)
                .command("r__optimize_static_geom")
                .precision(0),
            Opt::range("optimize_dynamic_geom", "2", 0.0, 4.0, 1.0)
                .command("r__optimize_dynamic_geom")
                .precision(0),
            Opt::toggle("optimize_shadow_geom", "true").command("r__optimize_shadow_geom"),
            // 渲染质量
            Opt::title("_rendering_quality"),
            Opt::range("texture_lod", "0", 0.0, 4.0, 1.0)
                .command("texture_lod")
                .precision(0),
            Opt::range("geometry_lod", "1.0", 0.1, 1.5, 0.1).command("r__geometry_lod"),
            Opt::range("mipbias", "0.0", -0.5, 0.5, 0.1).command("r__tf_mipbias"),
            Opt::list("tf_aniso", "16", &["1", "4", "8", "16"]).command("r__tf_aniso"),
            Opt::list("ssample_list", "st_opt_off", &["st_opt_off", "2x", "4x", "8x"])
                .command("r3_msaa"),
            Opt::list("smaa", "high", &["off", "low", "medium", "high", "ultra"])
                .command("r2_smaa"),
            Opt::toggle("ssfx_taa", "false").command("r3_ssfx_taa").one_zero(),
            Opt::toggle("detail_textures", "true").command("r1_detail_textures"),
            Opt::toggle("detail_bump", "true").command("r2_detail_bump"),
            Opt::toggle("steep_parallax", "true").command("r2_steep_parallax"),
            Opt::toggle("enable_tessellation", "true").command("r4_enable_tessellation"),
            Opt::radio("material_style", "st_opt_classic", &["st_opt_classic", "st_opt_pbr"])
                .command("r4_material_style"),
            // 草
            Opt::title("_grass"),
            Opt::range("detail_density", "0.6", 0.04, 1.0, 0.02).command("r__detail_density"),
            Opt::range("detail_radius", "150", 50.0, 250.0, 20.0)
                .command("r__detail_radius")
                .precision(0),
            Opt::range("detail_height", "1.0", 0.5, 2.0, 0.1).command("r__detail_height"),
            // 光照
            Opt::title("_lighting"),
            Opt::range("slight_fade", "0.5", 0.2, 1.0, 0.1).command("r2_slight_fade"),
            Opt::range("ls_squality", "1.0", 0.5, 1.0, 0.5).command("r2_ls_squality"),
            Opt::toggle("actor_shadow", "true").command("r__actor_shadow"),
            Opt::range("gloss_factor", "1", 0.0, 10.0, 0.5).command("r2_gloss_factor"),
            Opt::toggle("sun", "true").command("r2_sun").visible_when(dynamic_only()),
            Opt::list(
                "sun_quality",
                "st_opt_medium",
                &["st_opt_low", "st_opt_medium", "st_opt_high", "st_opt_ultra", "st_opt_extreme"],
            )
            .command("r2_sun_quality")
            .visible_when(dynamic_only()),
            Opt::list(
                "sunshafts_mode",
                "volumetric",
                &["off", "volumetric", "screen_space", "combined"],
            )
            .command("r2_sunshafts_mode")
            .visible_when(dynamic_only()),
            Opt::list(
                "sunshafts_quality",
                "st_opt_high",
                &["st_opt_low", "st_opt_medium", "st_opt_high"],
            )
            .command("r2_sunshafts_quality")
            .visible_when(sunshafts_enabled.clone()),
            Opt::range("sunshafts_value", "1.0", 0.5, 2.0, 0.1)
                .command("r2_sunshafts_value")
                .visible_when(sunshafts_enabled.clone()),
            Opt::range("sunshafts_min", "0.15", 0.0, 0.5, 0.05)
                .command("r2_sunshafts_min")
                .visible_when(sunshafts_enabled),
            Opt::radio("ssao_mode", "ssdo", &["gtao", "ssdo"])
                .command("r2_ssao_mode")
                .visible_when(dynamic_only()),
            Opt::list(
                "ssao",
                "st_opt_medium",
                &["st_opt_off", "st_opt_low", "st_opt_medium", "st_opt_high"],
            )
            .command("r2_ssao")
            .visible_when(dynamic_only()),
            Opt::toggle("volumetric_lights", "true")
                .command("r2_volumetric_lights")
                .visible_when(dynamic_only()),
            Opt::toggle("point_light_shadows", "false")
                .command("r4_point_light_shadows")
                .one_zero()
                .visible_when(dynamic_only()),
            // 特效
            Opt::title("_effects"),
            Opt::toggle("soft_particles", "true").command("r2_soft_particles"),
            Opt::toggle("dof_enable", "true").command("r2_dof_enable"),
            Opt::toggle("mblur_enable", "false").command("r2_mblur_enabled"),
            Opt::range("mblur", "0.4", 0.0, 1.0, 0.05)
                .command("r2_mblur")
                .visible_when(VisibilityRule::truthy("r2_mblur_enabled")),
            Opt::toggle("soft_water", "true").command("r2_soft_water"),
            Opt::toggle("ssfx_water", "false")
                .command("r3_ssfx_water")
                .one_zero()
                .visible_when(dynamic_only()),
            Opt::toggle("dynamic_wet_surfaces", "true").command("r3_dynamic_wet_surfaces"),
            Opt::toggle("volumetric_smoke", "true").command("r3_volumetric_smoke"),
            Opt::toggle("ssfx_fog", "false")
                .command("r3_ssfx_fog")
                .one_zero()
                .visible_when(dynamic_only()),
            Opt::toggle("ssfx_shadows", "false")
                .command("r3_ssfx_shadows")
                .one_zero()
                .visible_when(dynamic_only()),
            Opt::toggle("ssfx_gi", "false")
                .command("r3_gi")
                .one_zero()
                .visible_when(dynamic_only()),
            Opt::toggle("hires_rts", "true").command("r4_hires_rts").one_zero(),
            Opt::list(
                "terrain_quality",
                "st_terrain_low",
                &["st_terrain_low", "st_terrain_mid", "st_terrain_high"],
            )
            .command("r3_terrain_quality"),
        ],
    )
}

fn sound_page() -> OptionPage {
    OptionPage {
        id: "sound".to_string(),
        groups: vec![group(
            "general",
            vec![
                Opt::range("master_volume", "1.0", 0.0, 1.0, 0.1).command("snd_volume_eff"),
                Opt::range("music_volume", "0.8", 0.0, 1.0, 0.1).command("snd_volume_music"),
                Opt::list(
                    "audio_effects_quality",
                    "st_opt_medium",
                    &["st_opt_low", "st_opt_medium", "st_opt_high"],
                )
                .command("snd_audio_effects_quality"),
                Opt::toggle("dynamic_music", "false").command("g_dynamic_music"),
            ],
        )],
    }
}

fn control_page() -> OptionPage {
    OptionPage {
        id: "control".to_string(),
        groups: vec![
            group(
                "general",
                vec![
                    Opt::range("mouse_sens", "0.15", 0.001, 0.6, 0.01).command("mouse_sens"),
                    Opt::range("mouse_sens_aim", "1.0", 0.5, 2.0, 0.05).command("mouse_sens_aim"),
                    Opt::toggle("mouse_invert", "false").command("mouse_invert"),
                ],
            ),
            group(
                "toggles",
                vec![
                    Opt::toggle("crouch_toggle", "true").command("g_crouch_toggle"),
                    Opt::toggle("walk_toggle", "false").command("g_walk_toggle"),
                    Opt::toggle("sprint_toggle", "true").command("g_sprint_toggle"),
                    Opt::toggle("lookout_toggle", "false").command("g_lookout_toggle"),
                    Opt::toggle("aim_toggle", "false").command("wpn_aim_toggle").one_zero(),
                ],
            ),
            group(
                "misc",
                vec![
                    Opt::toggle("pickup_mode", "true").command("g_multi_item_pickup"),
                    Opt::toggle("simple_pda_mode", "true").command("g_simple_pda"),
                ],
            ),
        ],
    }
}

fn gameplay_page() -> OptionPage {
    OptionPage {
        id: "gameplay".to_string(),
        groups: vec![
            group(
                "general",
                vec![
                    Opt::toggle("outfit_portrait", "true")
                        .label("Outfit Portrait")
                        .description("Show faction outfit portrait in inventory"),
                    Opt::toggle("hardcore_ai_aim", "false")
                        .label("Hardcore AI Aim")
                        .description("AI has improved accuracy"),
                    Opt::range("corpse_max_count", "5", 0.0, 30.0, 1.0)
                        .precision(0)
                        .label("Max Corpse Count"),
                    Opt::range("corpse_min_dist", "75", 10.0, 300.0, 5.0)
                        .precision(0)
                        .label("Min Corpse Distance"),
                    Opt::range("max_tasks", "2", 1.0, 10.0, 1.0)
                        .precision(0)
                        .label("Max Active Tasks"),
                    Opt::separator("_sep"),
                    Opt::radio_vertical("difficulty", "normal", &["easy", "normal", "hard"])
                        .label("Economy Difficulty"),
                    Opt::text("player_name", "").label("Player Name"),
                    Opt::number_input("start_money", "5000").label("Starting Money"),
                ],
            ),
            group(
                "silent_kills",
                vec![
                    Opt::toggle("sk_enabled", "false").label("Enable Silent Kills"),
                    Opt::toggle("sk_melee_enabled", "true").label("Melee Silent Kills"),
                    Opt::toggle("sk_headshot_only", "true").label("Headshot Only"),
                ],
            ),
        ],
    }
}

/// 可配置战争行为的阵营，(id, 显示名)
const FACTIONS: &[(&str, &str)] = &[
    ("stalker", "Loners"),
    ("army", "Military"),
    ("bandit", "Bandits"),
    ("csky", "Clear Sky"),
    ("dolg", "Duty"),
    ("ecolog", "Ecologists"),
    ("freedom", "Freedom"),
    ("greh", "Sin"),
    ("isg", "ISG"),
    ("killer", "Mercenaries"),
    ("monolith", "Monolith"),
    ("renegade", "Renegades"),
    ("zombied", "Zombified"),
];

/// The Zone：A-Life、区域事件与战争模式
fn alife_page() -> OptionPage {
    let mut groups = vec![
        alife_general(),
        alife_events(),
        group(
            "neutral_zone",
            vec![
                Opt::toggle("rostok", "true").label("Rostok (Bar)"),
                Opt::toggle("yanov", "true").label("Yanov Station"),
                Opt::toggle("jupiter_bunker", "true").label("Jupiter Bunker"),
                Opt::toggle("yantar_bunker", "true").label("Yantar Bunker"),
            ],
        ),
        group(
            "npc_wounded",
            vec![Opt::list("handle_weapon", "1", &["0", "1", "2"])
                .label("Wounded Weapon Handling")
                .description("0 = drop, 1 = keep, 2 = stash")],
        ),
        warfare_general(),
    ];
    groups.extend(FACTIONS.iter().map(|(id, name)| faction_warfare(id, name)));

    OptionPage {
        id: "alife".to_string(),
        groups,
    }
}

fn alife_general() -> OptionGroup {
    group(
        "general",
        vec![
            Opt::range("alife_stalker_pop", "0.3", 0.1, 2.0, 0.1).label("Stalker Population"),
            Opt::range("alife_mutant_pop", "0.5", 0.1, 2.0, 0.1).label("Mutant Population"),
            Opt::toggle("dynamic_anomalies", "true")
                .label("Dynamic Anomalies")
                .description("Anomalies shift position after blowouts"),
            Opt::toggle("dynamic_relations", "true").label("Dynamic Relations"),
            Opt::range("excl_dist", "75", 10.0, 300.0, 5.0)
                .precision(0)
                .label("Exclusion Distance"),
            Opt::list("offline_combat", "full", &["off", "simple", "full"]).label("Offline Combat"),
            Opt::toggle("heli_spawn", "true").label("Helicopter Spawns"),
            Opt::toggle("war_goodwill_reset", "false").label("War Goodwill Reset"),
        ],
    )
}

fn alife_events() -> OptionGroup {
    let fates = ["kill_at_wave", "kill_at_peak", "damage_only"];
    let warnings = ["siren", "radio", "siren_radio", "none"];
    group(
        "event",
        vec![
            Opt::toggle("emission_state", "true").label("Emissions Enabled"),
            Opt::range("emission_frequency", "24", 1.0, 168.0, 1.0)
                .precision(0)
                .label("Emission Frequency (hours)"),
            Opt::list("emission_fate", "kill_at_wave", &fates).label("Emission Fate"),
            Opt::list("emission_warning", "siren_radio", &warnings).label("Emission Warning"),
            Opt::separator("_psi"),
            Opt::toggle("psi_storm_state", "true").label("Psi Storms Enabled"),
            Opt::range("psi_storm_frequency", "24", 1.0, 168.0, 1.0)
                .precision(0)
                .label("Psi Storm Frequency (hours)"),
            Opt::list("psi_storm_warning", "siren", &warnings).label("Psi Storm Warning"),
        ],
    )
}

fn warfare_general() -> OptionGroup {
    group(
        "warfare/general",
        vec![
            Opt::toggle("fog_of_war", "true").label("Fog of War"),
            Opt::range("fog_of_war_distance", "50", 10.0, 300.0, 10.0)
                .precision(0)
                .label("Fog of War Distance"),
            Opt::toggle("all_out_war", "false")
                .label("All Out War")
                .description("All factions fight each other"),
            Opt::toggle("auto_capture", "true").label("Auto Capture"),
            Opt::range("random_stalker_chance", "50", 0.0, 100.0, 5.0)
                .precision(0)
                .label("Random Stalker Chance %"),
            Opt::range("random_monster_chance", "50", 0.0, 100.0, 5.0)
                .precision(0)
                .label("Random Monster Chance %"),
        ],
    )
}

fn faction_warfare(faction: &str, name: &str) -> OptionGroup {
    group(
        &format!("warfare/{}", faction),
        vec![
            Opt::toggle("participate_in_warfare", "true")
                .label(&format!("{}: Participate in Warfare", name)),
            Opt::toggle("spawn_on_new_game", "true").label("Spawn on New Game"),
            Opt::range("expansion_aggression", "50", 0.0, 100.0, 5.0)
                .precision(0)
                .label("Expansion Aggression"),
            Opt::range("base_priority", "50", -100.0, 100.0, 5.0)
                .precision(0)
                .label("Base Priority"),
            Opt::range("offline_power_multiplier", "1.5", 0.1, 5.0, 0.1)
                .label("Offline Power Multiplier"),
            Opt::toggle("keep_last_base", "false").label("Keep Last Base"),
        ],
    )
}
