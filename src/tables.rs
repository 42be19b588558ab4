//! Fixed register data for the single supported mode.

use crate::regs::{bit, field_prep, genmask, RegisterWrite, REG_ANA_SEQ_A, REG_ANA_SEQ_B};
use crate::traits::Register;

const fn w(address: u16, value: u16) -> RegisterWrite {
    RegisterWrite::write(Register::reg8(address), value)
}

/// Analog block bring-up, applied after power-up has settled.
///
/// The order is part of the sensor's power-up protocol and must not change.
pub const ANALOG_BRINGUP: [RegisterWrite; 6] = [
    RegisterWrite::update(REG_ANA_SEQ_B, bit(5), 0),
    RegisterWrite::update(REG_ANA_SEQ_A, genmask(7, 4), field_prep(genmask(7, 4), 0xF)),
    RegisterWrite::update(REG_ANA_SEQ_A, bit(0), bit(0)),
    RegisterWrite::update(REG_ANA_SEQ_A, genmask(2, 1), field_prep(genmask(2, 1), 0x3)),
    RegisterWrite::update(REG_ANA_SEQ_B, bit(5), bit(5)),
    RegisterWrite::update(REG_ANA_SEQ_A, bit(2), 0),
];

/// Full-resolution 10-bit configuration, 4-lane CSI-2.
pub const MODE_COMMON_REGS: &[RegisterWrite] = &[
    w(0x2E00, 0x00),
    w(0x2E01, 0x01),
    w(0x2E02, 0x00),
    w(0x2E03, 0x06),
    w(0x2E04, 0x00),
    w(0x2E05, 0x08),
    w(0x2E06, 0x02),
    w(0x2E07, 0x00),
    w(0x2E08, 0x00),
    w(0x2E09, 0x00),
    w(0x2E0A, 0x00),
    w(0x2E0B, 0x01),
    w(0x2E0C, 0x00),
    w(0x2E0D, 0xBE),
    w(0x2E0E, 0x04),
    w(0x2E0F, 0x01),
    w(0x2E10, 0x00),
    w(0x2E11, 0x12),
    w(0x2E12, 0x00),
    w(0x2E13, 0x00),
    w(0x2E14, 0xBA),
    w(0x2E15, 0x04),
    w(0x2E16, 0x00),
    w(0x2E17, 0x00),
    w(0x2E18, 0x08),
    w(0x2E19, 0x00),
    w(0x2E1A, 0xB0),
    w(0x2E1B, 0x04),
    w(0x2E1C, 0x00),
    w(0x2E1D, 0x00),
    w(0x2E1E, 0x00),
    w(0x2E1F, 0x00),
    w(0x2E20, 0x00),
    w(0x2E21, 0x00),
    w(0x2E22, 0x00),
    w(0x2E23, 0x00),
    w(0x2E24, 0x00),
    w(0x2E25, 0x00),
    w(0x2E26, 0x00),
    w(0x2E27, 0x00),
    w(0x2E28, 0x00),
    w(0x2E29, 0x00),
    w(0x2E2A, 0x00),
    w(0x2E2B, 0x00),
    w(0x2E2C, 0x00),
    w(0x2E2D, 0x00),
    w(0x2E2E, 0x00),
    w(0x2E2F, 0x00),
    w(0x2E30, 0x00),
    w(0x2E31, 0x00),
    w(0x2E32, 0x00),
    w(0x2E33, 0x00),
    w(0x2E34, 0x00),
    w(0x2E35, 0x00),
    w(0x2E36, 0x00),
    w(0x2E37, 0x00),
    w(0x2E38, 0x00),
    w(0x2E39, 0x00),
    w(0x2E3A, 0x00),
    w(0x2E3B, 0x00),
    w(0x2E3C, 0x00),
    w(0x2E3D, 0x00),
    w(0x2E3E, 0x00),
    w(0x2E3F, 0x00),
    w(0x2E40, 0x00),
    w(0x2E41, 0x00),
    w(0x2E42, 0x00),
    w(0x2E43, 0x00),
    w(0x2E44, 0x00),
    w(0x2E45, 0x00),
    w(0x2E46, 0x00),
    w(0x2E47, 0x00),
    w(0x2E48, 0x00),
    w(0x2E49, 0x00),
    w(0x2E4A, 0x00),
    w(0x2E4B, 0x00),
    w(0x2E4C, 0x00),
    w(0x2E4D, 0x00),
    w(0x2E4E, 0x00),
    w(0x2E4F, 0x00),
    w(0x2E50, 0x00),
    w(0x2E51, 0x00),
    w(0x2E52, 0x00),
    w(0x2E53, 0x00),
    w(0x2E54, 0x00),
    w(0x2E55, 0x00),
    w(0x2E56, 0x00),
    w(0x2E57, 0x00),
    w(0x2E58, 0x01),
    w(0x2E59, 0x14),
    w(0x2E5A, 0x00),
    w(0x2E5B, 0x00),
    w(0x2E5C, 0x04),
    w(0x2E5D, 0x22),
    w(0x2E5E, 0x01),
    w(0x2E5F, 0x02),
    w(0x2E60, 0x02),
    w(0x2E61, 0x02),
    w(0x2E62, 0x06),
    w(0x2E63, 0x28),
    w(0x2E64, 0x01),
    w(0x2E65, 0x00),
    w(0x2E66, 0x02),
    w(0x2E67, 0x00),
    w(0x2E68, 0x24),
    w(0x2E69, 0x05),
    w(0x2E6A, 0x62),
    w(0x2E6B, 0x03),
    w(0x2E6C, 0x46),
    w(0x2E6D, 0x78),
    w(0x2E6E, 0x02),
    w(0x2E6F, 0x2A),
    w(0x2E70, 0xFF),
    w(0x2E71, 0xFF),
    w(0x2E72, 0xFF),
    w(0x2E73, 0xFF),
    w(0x2E74, 0x32),
    w(0x2E75, 0x64),
    w(0x2E76, 0x14),
    w(0x2E77, 0xFF),
    w(0x2E78, 0xFF),
    w(0x2E79, 0xFF),
    w(0x2E7A, 0x01),
    w(0x2E7B, 0x87),
    w(0x2E7C, 0xFF),
    w(0x2E7D, 0xFF),
    w(0x2E7E, 0x01),
    w(0x2E7F, 0x88),
    w(0x2E80, 0x05),
    w(0x2E81, 0x24),
    w(0x2E82, 0xFF),
    w(0x2E83, 0xFF),
    w(0x2E84, 0x05),
    w(0x2E85, 0x31),
    w(0x2E86, 0x5C),
    w(0x2E87, 0x84),
    w(0x2E88, 0x03),
    w(0x2E89, 0x0C),
    w(0x2E8A, 0x13),
    w(0x2E8B, 0x34),
    w(0x2E8C, 0xFF),
    w(0x2E8D, 0xFF),
    w(0x2E8E, 0xFF),
    w(0x2E8F, 0xFF),
    w(0x2E90, 0xFF),
    w(0x2E91, 0xFF),
    w(0x2E92, 0xFF),
    w(0x2E93, 0xFF),
    w(0x2E94, 0x04),
    w(0x2E95, 0x0C),
    w(0x2E96, 0x14),
    w(0x2E97, 0x34),
    w(0x2E98, 0x01),
    w(0x2E99, 0x02),
    w(0x2E9A, 0x11),
    w(0x2E9B, 0x12),
    w(0x2E9C, 0x04),
    w(0x2E9D, 0x0C),
    w(0x2E9E, 0x14),
    w(0x2E9F, 0x34),
    w(0x2EA0, 0x0B),
    w(0x2EA1, 0x0C),
    w(0x2EA2, 0x33),
    w(0x2EA3, 0x34),
    w(0x2EA4, 0x0C),
    w(0x2EA5, 0x14),
    w(0x2EA6, 0x10),
    w(0x2EA7, 0xFF),
    w(0x2EA8, 0x01),
    w(0x2EA9, 0x02),
    w(0x2EAA, 0x11),
    w(0x2EAB, 0x12),
    w(0x2EAC, 0x01),
    w(0x2EAD, 0x02),
    w(0x2EAE, 0xFF),
    w(0x2EAF, 0xFF),
    w(0x2EB0, 0xFF),
    w(0x2EB1, 0xFF),
    w(0x2EB2, 0xFF),
    w(0x2EB3, 0xFF),
    w(0x2EB4, 0xFF),
    w(0x2EB5, 0xFF),
    w(0x2EB6, 0x2E),
    w(0x2EB7, 0x1C),
    w(0x2EB8, 0x1E),
    w(0x2EB9, 0x0C),
    w(0x2EBA, 0x03),
    w(0x2EBB, 0x00),
    w(0x2EBC, 0x01),
    w(0x2EBD, 0x00),
    w(0x2EBE, 0x01),
    w(0x2EBF, 0x03),
    w(0x2EC0, 0x01),
    w(0x2EC1, 0x01),
    w(0x2EC2, 0x00),
    w(0x2EC3, 0x01),
    w(0x2EC4, 0x1E),
    w(0x2EC5, 0x0C),
    w(0x2EC6, 0x00),
    w(0x2EC7, 0x00),
    w(0x2EC8, 0x01),
    w(0x2EC9, 0x01),
    w(0x2ECA, 0x03),
    w(0x2ECB, 0x01),
    w(0x3000, 0x01),
    w(0x3001, 0x02),
    w(0x3002, 0x00),
    w(0x3003, 0x00),
    w(0x3004, 0x03),
    w(0x3005, 0x00),
    w(0x3006, 0x08),
    w(0x3007, 0x10),
    w(0x3008, 0x00),
    w(0x3009, 0x04),
    w(0x300A, 0x01),
    w(0x300B, 0x00),
    w(0x300C, 0x01),
    w(0x300D, 0x0F),
    w(0x300E, 0x00),
    w(0x300F, 0x01),
    w(0x3010, 0x01),
    w(0x3011, 0x01),
    w(0x3012, 0x00),
    w(0x3013, 0x00),
    w(0x3014, 0x8E),
    w(0x3015, 0x09),
    w(0x3016, 0x04),
    w(0x3017, 0x00),
    w(0x3018, 0x08),
    w(0x3019, 0x07),
    w(0x301A, 0x10),
    w(0x301B, 0x07),
    w(0x301C, 0x27),
    w(0x301D, 0x00),
    w(0x301E, 0x0B),
    w(0x301F, 0x09),
    w(0x3020, 0x05),
    w(0x3021, 0x06),
    w(0x3022, 0x96),
    w(0x3023, 0xF8),
    w(0x3024, 0x14),
    w(0x3025, 0x00),
    w(0x3026, 0x00),
    w(0x3027, 0x00),
    w(0x3028, 0x00),
    w(0x3029, 0x00),
    w(0x302A, 0x04),
    w(0x302B, 0x04),
    w(0x302C, 0x04),
    w(0x302D, 0x04),
    w(0x302E, 0x00),
    w(0x302F, 0x00),
    w(0x3030, 0x00),
    w(0x3031, 0x00),
    w(0x3039, 0x00),
    w(0x303A, 0x00),
    w(0x303B, 0x00),
    w(0x303C, 0x00),
    w(0x303D, 0x01),
    w(0x303E, 0x00),
    w(0x303F, 0x00),
    w(0x3040, 0x10),
    w(0x3041, 0x00),
    w(0x3042, 0x10),
    w(0x3043, 0x00),
    w(0x3044, 0x19),
    w(0x3045, 0x10),
    w(0x3046, 0x00),
    w(0x3047, 0x00),
    w(0x3048, 0x00),
    w(0x3049, 0x00),
    w(0x304A, 0x00),
    w(0x304B, 0x00),
    w(0x304C, 0x00),
    w(0x304D, 0x00),
    w(0x304E, 0x00),
    w(0x304F, 0x02),
    w(0x3050, 0x0A),
    w(0x3051, 0x02),
    w(0x3052, 0x00),
    w(0x3053, 0x10),
    w(0x3054, 0x00),
    w(0x3055, 0x00),
    w(0x3056, 0x5E),
    w(0x3057, 0x01),
    w(0x3058, 0x00),
    w(0x3059, 0x01),
    w(0x305A, 0x00),
    w(0x305B, 0x10),
    w(0x305C, 0x00),
    w(0x305D, 0x04),
    w(0x305E, 0x00),
    w(0x305F, 0x00),
    w(0x3060, 0x00),
    w(0x3200, 0x20),
    w(0x3201, 0x00),
    w(0x3202, 0x04),
    w(0x3203, 0x03),
    w(0x3204, 0x20),
    w(0x3205, 0x03),
    w(0x3206, 0x03),
    w(0x3207, 0x03),
    w(0x3208, 0x16),
    w(0x3209, 0x04),
    w(0x320A, 0x00),
    w(0x320B, 0x16),
    w(0x320C, 0x04),
    w(0x320D, 0x1A),
    w(0x320E, 0x0F),
    w(0x320F, 0x00),
    w(0x3210, 0x11),
    w(0x3211, 0x07),
    w(0x3212, 0x00),
    w(0x3213, 0x0E),
    w(0x3214, 0x1B),
    w(0x3215, 0x03),
    w(0x3216, 0x3F),
    w(0x3217, 0x04),
    w(0x3218, 0x07),
    w(0x3219, 0x00),
    w(0x321A, 0x3F),
    w(0x321B, 0x07),
    w(0x321C, 0x00),
    w(0x321D, 0x04),
    w(0x321E, 0x3F),
    w(0x321F, 0x04),
    w(0x3220, 0x07),
    w(0x3221, 0x00),
    w(0x3222, 0x14),
    w(0x3223, 0x03),
    w(0x3224, 0x00),
    w(0x3225, 0x00),
    w(0x3226, 0x3F),
    w(0x3227, 0x03),
    w(0x3228, 0x00),
    w(0x3229, 0x00),
    w(0x322A, 0x06),
    w(0x322B, 0x03),
    w(0x322C, 0x1B),
    w(0x322D, 0x00),
    w(0x322E, 0x07),
    w(0x322F, 0x03),
    w(0x3230, 0x0E),
    w(0x3231, 0x41),
    w(0x3232, 0x53),
    w(0x3233, 0x4E),
    w(0x3234, 0x47),
    w(0x3235, 0x47),
    w(0x3236, 0x47),
    w(0x3237, 0x47),
    w(0x3238, 0x50),
    w(0x3239, 0x47),
    w(0x323A, 0x53),
    w(0x323B, 0x53),
    w(0x323C, 0x4A),
    w(0x323D, 0x4A),
    w(0x323E, 0x68),
    w(0x323F, 0x0A),
    w(0x3240, 0x00),
    w(0x3241, 0x1A),
    w(0x3242, 0x20),
    w(0x3243, 0x04),
    w(0x3244, 0x13),
    w(0x3245, 0x13),
    w(0x3246, 0x30),
    w(0x3247, 0x30),
    w(0x3248, 0x7D),
    w(0x3249, 0x1C),
    w(0x324A, 0x1E),
    w(0x324B, 0x00),
    w(0x324C, 0x00),
    w(0x324D, 0x00),
    w(0x324E, 0x00),
    w(0x3300, 0x00),
    w(0x3301, 0x00),
    w(0x3302, 0x00),
    w(0x3303, 0x00),
    w(0x3304, 0x00),
    w(0x3305, 0x00),
    w(0x3306, 0x00),
    w(0x3307, 0x01),
    w(0x3308, 0x00),
    w(0x3311, 0xD0),
    w(0x3312, 0x07),
    w(0x3313, 0xB8),
    w(0x3314, 0x0B),
    w(0x3315, 0xF4),
    w(0x3316, 0x01),
    w(0x3317, 0xE8),
    w(0x3318, 0x03),
    w(0x3319, 0xE8),
    w(0x331A, 0x03),
    w(0x331B, 0xE8),
    w(0x331C, 0x03),
    w(0x331D, 0xA0),
    w(0x331E, 0x0F),
    w(0x331F, 0xD0),
    w(0x3320, 0x07),
    w(0x3321, 0x01),
    w(0x3322, 0x00),
    w(0x3323, 0x01),
    w(0x3324, 0x00),
    w(0x3325, 0x01),
    w(0x3326, 0x00),
    w(0x3327, 0x01),
    w(0x3328, 0x00),
    w(0x3329, 0x01),
    w(0x332A, 0x00),
    w(0x332B, 0x01),
    w(0x332C, 0x00),
    w(0x332D, 0xA0),
    w(0x332E, 0x0F),
    w(0x332F, 0xE8),
    w(0x3330, 0x03),
    w(0x3331, 0xD0),
    w(0x3332, 0x07),
    w(0x3333, 0x03),
    w(0x3334, 0x00),
    w(0x3335, 0xA0),
    w(0x3336, 0x0F),
    w(0x3337, 0xD0),
    w(0x3338, 0x07),
    w(0x3339, 0xF4),
    w(0x333A, 0x01),
    w(0x333B, 0x3C),
    w(0x333C, 0x00),
    w(0x333D, 0xB8),
    w(0x333E, 0x0B),
    w(0x333F, 0xE8),
    w(0x3340, 0x03),
    w(0x3341, 0xE8),
    w(0x3342, 0x03),
    w(0x3343, 0xE8),
    w(0x3344, 0x03),
    w(0x3345, 0x55),
    w(0x3346, 0x55),
    w(0x3347, 0x55),
    w(0x3348, 0x55),
    w(0x3349, 0x55),
    w(0x334A, 0x55),
    w(0x334B, 0x55),
    w(0x334C, 0x55),
    w(0x334D, 0x10),
    w(0x334E, 0x32),
    w(0x334F, 0x54),
    w(0x3350, 0x9A),
    w(0x3351, 0xCD),
    w(0x3352, 0x7B),
    w(0x3353, 0xE8),
    w(0x3354, 0x6F),
    w(0x3355, 0x10),
    w(0x3356, 0x42),
    w(0x3357, 0x95),
    w(0x3358, 0xEA),
    w(0x3359, 0xCD),
    w(0x335A, 0x3B),
    w(0x335B, 0x87),
    w(0x335C, 0x6E),
    w(0x335D, 0x00),
    w(0x335E, 0x00),
    w(0x335F, 0x00),
    w(0x3360, 0x00),
    w(0x3361, 0x01),
    w(0x3362, 0x00),
    w(0x3400, 0x00),
    w(0x3401, 0x12),
    w(0x3402, 0x00),
    w(0x3403, 0x00),
    w(0x3404, 0x64),
    w(0x3405, 0x02),
];
